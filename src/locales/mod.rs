//! Localization module for tunefetch
//!
//! Holds the user-facing message catalogs and picks one per request from the
//! sender's Telegram language code, falling back to the configured locale.

use teloxide::utils::html::escape;

/// Message catalog language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    En,
    Uk,
}

impl Lang {
    /// Parse a language code like `uk` or `en-US`
    pub fn from_code(code: &str) -> Option<Self> {
        let base = code.split(['-', '_']).next().unwrap_or(code);
        match base.to_ascii_lowercase().as_str() {
            "en" => Some(Lang::En),
            "uk" | "ua" => Some(Lang::Uk),
            _ => None,
        }
    }
}

/// Pick the catalog language for a sender, falling back to `default_code`, then English
pub fn pick(preferred: Option<&str>, default_code: &str) -> Lang {
    preferred
        .and_then(Lang::from_code)
        .or_else(|| Lang::from_code(default_code))
        .unwrap_or_default()
}

/// User-facing messages in one language.
///
/// Methods that interpolate provider or user text escape it for HTML parse mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Catalog {
    lang: Lang,
}

impl Catalog {
    pub fn new(lang: Lang) -> Self {
        Self { lang }
    }

    pub fn welcome(&self) -> &'static str {
        match self.lang {
            Lang::En => {
                "Hi! I find music and send it to you 🎧\n\n\
                 Just type a song title and/or artist, for example:\n\
                 • dua lipa houdini\n\
                 • the weeknd blinding lights\n\n\
                 <i>Powered by YouTube → mp3</i>"
            }
            Lang::Uk => {
                "Привіт! Я бот, який шукає і надсилає музику 🎧\n\n\
                 Просто напиши назву пісні та/або виконавця, наприклад:\n\
                 • dua lipa houdini\n\
                 • the weeknd blinding lights\n\
                 • кравець пам’ятаєш\n\n\
                 <i>Працюю через YouTube → mp3</i>"
            }
        }
    }

    pub fn search_prompt(&self) -> &'static str {
        match self.lang {
            Lang::En => "Type a song title / artist:",
            Lang::Uk => "Напиши назву пісні / виконавця:",
        }
    }

    pub fn too_short(&self, min: usize) -> String {
        match self.lang {
            Lang::En => format!("The query is too short. Type at least {} characters.", min),
            Lang::Uk => format!("Запит занадто короткий. Напиши хоча б {} символи.", min),
        }
    }

    pub fn too_long(&self) -> &'static str {
        match self.lang {
            Lang::En => "The query is too long. Try a shorter one.",
            Lang::Uk => "Запит занадто довгий. Спробуй коротше.",
        }
    }

    pub fn text_only(&self) -> &'static str {
        match self.lang {
            Lang::En => {
                "I only accept text queries (title + artist) for now.\n\
                 Send something like: «the weeknd blinding lights»"
            }
            Lang::Uk => {
                "Я зараз приймаю тільки текстовий запит (назва + виконавець).\n\
                 Надішли, наприклад: «the weeknd blinding lights»"
            }
        }
    }

    pub fn searching(&self) -> &'static str {
        match self.lang {
            Lang::En => "🔍 Searching...",
            Lang::Uk => "🔍 Шукаю...",
        }
    }

    pub fn search_failed(&self) -> &'static str {
        match self.lang {
            Lang::En => "Could not find the track 😔\nTry another query.",
            Lang::Uk => "Не вдалося знайти трек 😔\nСпробуйте інший запит.",
        }
    }

    pub fn nothing_found(&self) -> &'static str {
        match self.lang {
            Lang::En => "Nothing found for this query.\nTry rephrasing it.",
            Lang::Uk => "Нічого не знайдено за запитом.\nСпробуйте змінити формулювання.",
        }
    }

    pub fn downloading(&self, title: &str, uploader: &str, duration: &str) -> String {
        let tail = match self.lang {
            Lang::En => "Downloading and converting to mp3... ⏳",
            Lang::Uk => "Завантажую та конвертую в mp3... ⏳",
        };
        format!(
            "🎵 <b>{}</b>\n👤 {}\n⏱ {}\n\n{}",
            escape(title),
            escape(uploader),
            duration,
            tail
        )
    }

    pub fn output_missing(&self) -> &'static str {
        match self.lang {
            Lang::En => "Could not find the finished mp3 after conversion 😢",
            Lang::Uk => "Не вдалося знайти готовий mp3 після конвертації 😢",
        }
    }

    pub fn file_not_created(&self) -> &'static str {
        match self.lang {
            Lang::En => "The file was not created after downloading 😢",
            Lang::Uk => "Файл не створено після завантаження 😢",
        }
    }

    pub fn oversized(&self, size_mb: f64, limit_mb: f64) -> String {
        match self.lang {
            Lang::En => format!(
                "The file is too large ({:.1} MB > {} MB).\n\
                 Telegram does not allow sending such files without Premium.",
                size_mb, limit_mb
            ),
            Lang::Uk => format!(
                "Файл завеликий ({:.1} MB > {} MB).\n\
                 Telegram не дозволяє надсилати такі файли без Premium.",
                size_mb, limit_mb
            ),
        }
    }

    pub fn sending(&self) -> &'static str {
        match self.lang {
            Lang::En => "Sending audio... 📤",
            Lang::Uk => "Надсилаю аудіо... 📤",
        }
    }

    /// Generic failure; `detail` is already truncated by the caller
    pub fn error(&self, detail: &str) -> String {
        match self.lang {
            Lang::En => format!("Something went wrong: {}...", escape(detail)),
            Lang::Uk => format!("Сталася помилка: {}...", escape(detail)),
        }
    }

    /// Labels used in the audio caption: (artist, duration, query)
    pub fn caption_labels(&self) -> (&'static str, &'static str, &'static str) {
        match self.lang {
            Lang::En => ("Artist", "Duration", "Query"),
            Lang::Uk => ("Виконавець", "Тривалість", "Запит"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_from_code() {
        assert_eq!(Lang::from_code("en"), Some(Lang::En));
        assert_eq!(Lang::from_code("en-US"), Some(Lang::En));
        assert_eq!(Lang::from_code("uk"), Some(Lang::Uk));
        assert_eq!(Lang::from_code("UK_ua"), Some(Lang::Uk));
        assert_eq!(Lang::from_code("de"), None);
    }

    #[test]
    fn test_pick_falls_back() {
        assert_eq!(pick(Some("uk"), "en"), Lang::Uk);
        assert_eq!(pick(Some("de"), "uk"), Lang::Uk);
        assert_eq!(pick(None, "fr"), Lang::En);
    }

    #[test]
    fn test_downloading_escapes_html() {
        let catalog = Catalog::new(Lang::En);
        let text = catalog.downloading("<Live> & Loud", "Band", "03:05");
        assert!(text.contains("&lt;Live&gt; &amp; Loud"));
        assert!(text.contains("03:05"));
    }

    #[test]
    fn test_oversized_formats_size() {
        let catalog = Catalog::new(Lang::En);
        let text = catalog.oversized(60.04, 48.0);
        assert!(text.contains("60.0 MB > 48 MB"));
    }
}
