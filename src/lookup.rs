//! Name lookup and listing helpers over a loaded [`Directory`]

use crate::directory::{Classification, Directory, Entity};

/// Find an entity by name.
///
/// An exact key match wins. Otherwise the first key, in directory order, that
/// contains `term` case-insensitively is returned. Blank terms match nothing.
pub fn find<'a>(term: &str, directory: &'a Directory) -> Option<&'a Entity> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }

    if let Some(entity) = directory.get(term) {
        return Some(entity);
    }

    let needle = term.to_lowercase();
    directory
        .entities
        .iter()
        .find(|(name, _)| name.to_lowercase().contains(&needle))
        .map(|(_, entity)| entity)
}

/// Entity names sorted alphabetically, ignoring case.
pub fn sorted_names(directory: &Directory) -> Vec<&str> {
    let mut names: Vec<&str> = directory.entities.keys().map(String::as_str).collect();
    names.sort_by_cached_key(|name| name.to_lowercase());
    names
}

/// Number of entities per classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationCounts {
    pub email: usize,
    pub form: usize,
    pub multiple: usize,
}

impl ClassificationCounts {
    pub fn total(&self) -> usize {
        self.email + self.form + self.multiple
    }
}

pub fn count_by_classification(directory: &Directory) -> ClassificationCounts {
    directory
        .iter()
        .fold(ClassificationCounts::default(), |mut counts, entity| {
            match entity.classification {
                Classification::Email => counts.email += 1,
                Classification::Form => counts.form += 1,
                Classification::Multiple => counts.multiple += 1,
            }
            counts
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::ContactRecord;
    use chrono::NaiveDate;

    fn directory(entries: &[(&str, &[&str])]) -> Directory {
        let mut dir = Directory::new("https://example.test", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        for (name, contacts) in entries {
            let contacts = contacts.iter().filter_map(|c| ContactRecord::new(c, None)).collect();
            dir.insert(Entity::new(*name, contacts).unwrap());
        }
        dir
    }

    #[test]
    fn test_substring_match_is_case_insensitive() {
        let dir = directory(&[("Google", &["abuse@google.com"]), ("Microsoft", &["https://msrc.microsoft.com"])]);
        assert_eq!(find("micro", &dir).unwrap().name, "Microsoft");
        assert_eq!(find("MICROSOFT", &dir).unwrap().name, "Microsoft");
    }

    #[test]
    fn test_exact_key_beats_earlier_substring() {
        let dir = directory(&[("Discord Nitro", &["a@nitro.test"]), ("Discord", &["a@discord.test"])]);
        assert_eq!(find("Discord", &dir).unwrap().name, "Discord");
        // Substring ties resolve in directory order
        assert_eq!(find("disc", &dir).unwrap().name, "Discord Nitro");
    }

    #[test]
    fn test_no_match() {
        let dir = directory(&[("Google", &["abuse@google.com"])]);
        assert!(find("yahoo", &dir).is_none());
        assert!(find("   ", &dir).is_none());
    }

    #[test]
    fn test_term_is_trimmed() {
        let dir = directory(&[("Google", &["abuse@google.com"])]);
        assert_eq!(find("  goo ", &dir).unwrap().name, "Google");
    }

    #[test]
    fn test_sorted_names_ignore_case() {
        let dir = directory(&[("zoom", &["a@z.test"]), ("Apple", &["a@a.test"]), ("bing", &["a@b.test"])]);
        assert_eq!(sorted_names(&dir), vec!["Apple", "bing", "zoom"]);
    }

    #[test]
    fn test_counts() {
        let dir = directory(&[
            ("A", &["a@a.test"]),
            ("B", &["https://b.test"]),
            ("C", &["https://c.test", "c@c.test"]),
            ("D", &["d@d.test"]),
        ]);
        let counts = count_by_classification(&dir);
        assert_eq!(counts, ClassificationCounts { email: 2, form: 1, multiple: 1 });
        assert_eq!(counts.total(), 4);
    }
}
