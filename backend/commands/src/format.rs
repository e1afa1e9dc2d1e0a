/// Reply formatter: turns handler results into transport-neutral payloads.
///
/// Pure functions only. Every body passes through [`ReplyFormatter::fit`], so
/// the rendered text never exceeds the transport's message size limit.
use shart_core::{
    Attachment, Color, CommandError, LibraryFilter, MediaRecord, MediaType, QualityProfile,
    ReplyPayload, RootFolder, SearchHit,
};

use crate::registry::CommandRegistry;

const TRUNCATION_SUFFIX: &str = "\n… (truncated)";

#[derive(Debug, Clone, Copy)]
pub struct ReplyFormatter {
    max_len: usize,
}

impl ReplyFormatter {
    /// Search results beyond this are summarised as a count.
    pub const SEARCH_RESULT_LIMIT: usize = 10;
    pub const LIBRARY_PAGE_SIZE: usize = 20;

    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn text(&self, text: impl AsRef<str>) -> ReplyPayload {
        ReplyPayload::text(self.fit(text.as_ref()))
    }

    // -----------------------------------------------------------------------
    // Command results
    // -----------------------------------------------------------------------

    /// `id_source` labels the id field, e.g. `TMDB`.
    pub fn search(&self, media: MediaType, id_source: &str, term: &str, hits: &[SearchHit]) -> ReplyPayload {
        if hits.is_empty() {
            return ReplyPayload::text("No results found");
        }

        let shown = &hits[..hits.len().min(Self::SEARCH_RESULT_LIMIT)];
        let mut lines = vec![format!("Searched for `{term}`:")];
        lines.extend(shown.iter().map(|hit| {
            format!("- {} {} ({})", hit.title, year_label(hit.year), hit.external_id)
        }));
        if hits.len() > shown.len() {
            lines.push(format!("…and {} more", hits.len() - shown.len()));
        }

        shown.iter().fold(self.text(lines.join("\n")), |reply, hit| {
            let attachment = Attachment::new(
                format!("{} ({})", hit.title, year_label(hit.year)),
                hit.overview.clone().unwrap_or_default(),
            )
            .with_field(id_source, hit.external_id.to_string(), true)
            .with_action("Add", format!("add {media} {}", hit.external_id));
            reply.with_attachment(attachment)
        })
    }

    /// One page of the library. `page` is 1-based and clamped to the valid range.
    pub fn library(
        &self,
        media: MediaType,
        filter: LibraryFilter,
        records: &[MediaRecord],
        page: usize,
    ) -> ReplyPayload {
        if records.is_empty() {
            return match filter {
                LibraryFilter::All => ReplyPayload::text(format!("Your {media} library is empty")),
                _ => ReplyPayload::text(format!("No {media} titles match `{}`", filter.as_str())),
            };
        }

        let pages = records.len().div_ceil(Self::LIBRARY_PAGE_SIZE);
        let page = page.clamp(1, pages);
        let start = (page - 1) * Self::LIBRARY_PAGE_SIZE;
        let end = (start + Self::LIBRARY_PAGE_SIZE).min(records.len());

        let mut lines = vec![format!(
            "{} titles ({}), page {page} of {pages}:",
            records.len(),
            filter.as_str()
        )];
        lines.extend(records[start..end].iter().map(|record| {
            let marker = if record.downloaded { "✅" } else { "⬜" };
            format!("{marker} {} {}", record.title, year_label(record.year))
        }));
        if page < pages {
            lines.push(format!("Page {page} of {pages}. Ask for page {} to see more.", page + 1));
        }
        self.text(lines.join("\n"))
    }

    pub fn profiles(&self, media: MediaType, profiles: &[QualityProfile]) -> ReplyPayload {
        if profiles.is_empty() {
            return ReplyPayload::text(format!("No quality profiles configured for {media}"));
        }
        let mut lines = vec![format!("Quality profiles for {media}:")];
        lines.extend(profiles.iter().map(|p| format!("{}: {}", p.id, p.name)));
        self.text(lines.join("\n"))
    }

    pub fn folders(&self, media: MediaType, folders: &[RootFolder]) -> ReplyPayload {
        if folders.is_empty() {
            return ReplyPayload::text(format!("No root folders configured for {media}"));
        }
        let mut lines = vec![format!("Root folders for {media}:")];
        lines.extend(folders.iter().map(|f| format!("{}: {}", f.id, f.path)));
        self.text(lines.join("\n"))
    }

    pub fn discover(&self, media: MediaType, records: &[MediaRecord]) -> ReplyPayload {
        if records.is_empty() {
            return ReplyPayload::text(format!("No {media} recommendations right now"));
        }
        let lines: Vec<String> = records
            .iter()
            .map(|r| match r.overview.as_deref().filter(|o| !o.is_empty()) {
                Some(overview) => format!(
                    "- {} {} ({}): {}",
                    r.title,
                    year_label(r.year),
                    r.external_id,
                    first_sentence(overview)
                ),
                None => format!("- {} {} ({})", r.title, year_label(r.year), r.external_id),
            })
            .collect();
        self.text(lines.join("\n")).with_title(format!("Recommended {media} titles"))
    }

    /// Colour-coded reachability summary, one attachment per backend.
    pub fn connection(&self, results: &[(String, bool)]) -> ReplyPayload {
        let lines: Vec<String> = results
            .iter()
            .map(|(name, ok)| connection_line(name, *ok))
            .collect();
        results.iter().fold(self.text(lines.join("\n")), |reply, (name, ok)| {
            let color = if *ok { Color::Good } else { Color::Danger };
            reply.with_attachment(Attachment::new(name.clone(), connection_line(name, *ok)).with_color(color))
        })
    }

    /// Every registered command with its usage string.
    pub fn help(&self, trigger: &str, registry: &CommandRegistry) -> ReplyPayload {
        let prefix = if trigger.is_empty() { String::new() } else { format!("{trigger} ") };
        let mut lines = vec!["Available commands:".to_string()];
        lines.push(format!("`{prefix}help` - Show this list."));
        lines.extend(registry.all().iter().map(|c| {
            let aliases = if c.def.aliases.is_empty() {
                String::new()
            } else {
                format!(" (also: {})", c.def.aliases.join(", "))
            };
            format!("`{prefix}{}` - {}{aliases}", c.def.usage, c.def.description)
        }));
        self.text(lines.join("\n")).with_title("Shart help")
    }

    pub fn error(&self, err: &CommandError) -> ReplyPayload {
        let text = match err {
            CommandError::Usage(message) => format!("❌ {message}"),
            CommandError::Precondition(message) => format!("⚠️ {message}"),
            CommandError::Unsupported(message) => format!("🚫 {message}"),
            CommandError::Unauthorized => "⛔ Not authorized".to_string(),
            CommandError::Timeout(secs) => {
                format!("❌ The command did not finish within {secs}s, try again later")
            }
            CommandError::Backend { message, .. } | CommandError::Transport { message, .. } => {
                format!("❌ {message}")
            }
        };
        self.text(text)
    }

    // -----------------------------------------------------------------------
    // Size limit
    // -----------------------------------------------------------------------

    /// Truncate `text` to at most `max_len` characters, cutting at a line
    /// boundary when possible and marking the cut.
    pub fn fit(&self, text: &str) -> String {
        if text.chars().count() <= self.max_len {
            return text.to_string();
        }
        let suffix_len = TRUNCATION_SUFFIX.chars().count();
        let room = self.max_len.saturating_sub(suffix_len);

        let mut kept = String::new();
        let mut used = 0;
        for line in text.lines() {
            let cost = line.chars().count() + usize::from(!kept.is_empty());
            if used + cost > room {
                break;
            }
            if !kept.is_empty() {
                kept.push('\n');
            }
            kept.push_str(line);
            used += cost;
        }
        if kept.is_empty() {
            kept = text.chars().take(room).collect();
        }
        if self.max_len < suffix_len {
            return kept;
        }
        kept.push_str(TRUNCATION_SUFFIX);
        kept
    }
}

fn year_label(year: Option<i32>) -> String {
    year.map_or_else(|| "n/a".to_string(), |y| y.to_string())
}

fn connection_line(name: &str, ok: bool) -> String {
    if ok {
        format!("Connection to {name} worked!")
    } else {
        format!("Connection to {name} failed!")
    }
}

fn first_sentence(text: &str) -> &str {
    match text.find(". ") {
        Some(end) => &text[..=end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, year: i32, id: u64) -> SearchHit {
        SearchHit {
            title: title.into(),
            year: Some(year),
            external_id: id,
            overview: None,
        }
    }

    fn record(title: &str, downloaded: bool) -> MediaRecord {
        MediaRecord {
            title: title.into(),
            year: Some(2000),
            downloaded,
            monitored: true,
            ..Default::default()
        }
    }

    #[test]
    fn empty_search_is_no_results_found() {
        let reply = ReplyFormatter::new(4000).search(MediaType::Movie, "TMDB", "nothing", &[]);
        assert_eq!(reply.text, "No results found");
        assert!(reply.attachments.is_empty());
    }

    #[test]
    fn search_lines_carry_title_year_and_id() {
        let reply = ReplyFormatter::new(4000).search(
            MediaType::Movie,
            "TMDB",
            "interstellar",
            &[hit("Interstellar", 2014, 157336)],
        );
        assert!(reply.text.lines().any(|l| l == "- Interstellar 2014 (157336)"));
        assert_eq!(reply.attachments.len(), 1);
        assert_eq!(reply.attachments[0].actions[0].command, "add movie 157336");
    }

    #[test]
    fn search_is_capped() {
        let hits: Vec<SearchHit> = (0..15).map(|i| hit("Title", 2000, i)).collect();
        let reply = ReplyFormatter::new(4000).search(MediaType::Show, "TVDB", "title", &hits);
        assert_eq!(reply.attachments.len(), ReplyFormatter::SEARCH_RESULT_LIMIT);
        assert!(reply.text.ends_with("…and 5 more"));
    }

    #[test]
    fn library_paginates_and_clamps() {
        let records: Vec<MediaRecord> = (0..45).map(|i| record(&format!("Movie {i}"), i % 2 == 0)).collect();
        let formatter = ReplyFormatter::new(4000);

        let first = formatter.library(MediaType::Movie, LibraryFilter::All, &records, 1);
        assert!(first.text.contains("page 1 of 3"));
        assert!(first.text.contains("✅ Movie 0 2000"));
        assert!(first.text.contains("⬜ Movie 1 2000"));
        assert!(!first.text.contains("Movie 20 "));

        let clamped = formatter.library(MediaType::Movie, LibraryFilter::All, &records, 99);
        assert!(clamped.text.contains("page 3 of 3"));
        assert!(clamped.text.contains("Movie 44"));
    }

    #[test]
    fn library_stays_under_limit() {
        let records: Vec<MediaRecord> = (0..20).map(|i| record(&"x".repeat(150 + i), true)).collect();
        let formatter = ReplyFormatter::new(2000);
        let reply = formatter.library(MediaType::Show, LibraryFilter::Downloaded, &records, 1);
        assert!(reply.text.chars().count() <= 2000);
        assert!(reply.text.ends_with(TRUNCATION_SUFFIX));
    }

    #[test]
    fn fit_cuts_at_line_boundaries() {
        let formatter = ReplyFormatter::new(30);
        let text = "first line\nsecond line\nthird line is long";
        let fitted = formatter.fit(text);
        assert!(fitted.chars().count() <= 30);
        assert!(fitted.starts_with("first line"));
        assert_eq!(formatter.fit(text), fitted);
    }

    #[test]
    fn fit_cuts_a_single_long_line() {
        let formatter = ReplyFormatter::new(20);
        let fitted = formatter.fit(&"é".repeat(100));
        assert_eq!(fitted.chars().count(), 20);
    }

    #[test]
    fn profiles_and_folders_are_id_colon_value() {
        let formatter = ReplyFormatter::new(4000);
        let profiles = formatter.profiles(
            MediaType::Movie,
            &[QualityProfile { id: 4, name: "HD-1080p".into() }],
        );
        assert!(profiles.text.contains("4: HD-1080p"));
        let folders = formatter.folders(
            MediaType::Show,
            &[RootFolder { id: 2, path: "/tv".into(), free_space: None }],
        );
        assert!(folders.text.contains("2: /tv"));
    }

    #[test]
    fn connection_is_colour_coded() {
        let reply = ReplyFormatter::new(4000)
            .connection(&[("radarr".into(), true), ("sonarr".into(), false)]);
        assert_eq!(reply.attachments[0].color, Some(Color::Good));
        assert_eq!(reply.attachments[1].color, Some(Color::Danger));
        assert!(reply.text.contains("Connection to sonarr failed!"));
    }

    #[test]
    fn errors_are_prefixed_by_kind() {
        let formatter = ReplyFormatter::new(4000);
        assert!(formatter.error(&CommandError::usage("bad")).text.starts_with("❌"));
        assert!(formatter.error(&CommandError::precondition("setup")).text.starts_with("⚠️"));
        assert_eq!(formatter.error(&CommandError::Unauthorized).text, "⛔ Not authorized");
    }
}
