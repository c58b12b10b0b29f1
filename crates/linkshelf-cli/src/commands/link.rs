//! Link command handlers

use anyhow::{Context, Result};

use linkshelf_core::{KeyValueStorage, LinkRecord, LinkRepository};

use crate::output::{Output, OutputFormat};
use crate::prompt::confirm;

/// Save a new link
pub fn add<S: KeyValueStorage>(
    repo: &mut LinkRepository<S>,
    title: &str,
    url: &str,
    description: &str,
    output: &Output,
) -> Result<()> {
    let saved = repo.add(title, description, url)?;

    if let Some(ref e) = saved.store_error {
        output.store_warning(e);
    }

    output.success("Link saved successfully!");
    output.print_link(&saved.value);

    Ok(())
}

/// Show the newest links
pub fn recent<S: KeyValueStorage>(
    repo: &LinkRepository<S>,
    count: usize,
    output: &Output,
) -> Result<()> {
    output.print_recent(repo.recent(count), repo.len());
    Ok(())
}

/// List all links, newest first
pub fn list<S: KeyValueStorage>(repo: &LinkRepository<S>, output: &Output) -> Result<()> {
    output.print_links(repo.all());
    Ok(())
}

/// Search links by title
pub fn search<S: KeyValueStorage>(
    repo: &LinkRepository<S>,
    term: Option<&str>,
    output: &Output,
) -> Result<()> {
    let term = match term {
        Some(t) if !t.trim().is_empty() => t,
        _ => {
            output.message("Search cancelled.");
            return Ok(());
        }
    };

    let hits: Vec<LinkRecord> = repo.search(term).cloned().collect();
    if hits.is_empty() && output.format == OutputFormat::Human {
        output.message("No links found with that title!");
        return Ok(());
    }

    output.print_links(&hits);
    Ok(())
}

/// Delete a link
///
/// Deleting an id that is not saved succeeds without changes.
pub fn delete<S: KeyValueStorage>(
    repo: &mut LinkRepository<S>,
    id: i64,
    skip_confirm: bool,
    output: &Output,
) -> Result<()> {
    let Some(link) = repo.get(id).cloned() else {
        output.message(&format!("No link with id {}. Nothing to delete.", id));
        return Ok(());
    };

    // Confirm deletion
    if output.should_prompt() && !skip_confirm {
        println!("Delete link: {} - {}", link.id, link.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let saved = repo.remove(id);
    if let Some(ref e) = saved.store_error {
        output.store_warning(e);
    }

    output.success(&format!("Deleted link: {}", link.id));

    Ok(())
}

/// Open a link in the default browser
pub fn open<S: KeyValueStorage>(repo: &LinkRepository<S>, id: i64, output: &Output) -> Result<()> {
    let link = repo
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Link not found: {}", id))?;

    open::that(&link.url).with_context(|| format!("Failed to open {}", link.url))?;

    output.success(&format!("Opened {}", link.url));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkshelf_core::{MemoryStorage, ValidationError};

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[test]
    fn test_add_saves_normalized_link() {
        let mut repo = LinkRepository::open(MemoryStorage::new());

        add(&mut repo, "Example", "example.com", "", &quiet()).unwrap();

        assert_eq!(repo.len(), 1);
        assert_eq!(repo.all()[0].url, "https://example.com");
    }

    #[test]
    fn test_add_reports_validation_error() {
        let mut repo = LinkRepository::open(MemoryStorage::new());

        let err = add(&mut repo, "Example", "not a url", "", &quiet()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::MalformedUrl { .. })
        ));
        assert!(repo.is_empty());
    }

    #[test]
    fn test_add_succeeds_when_storage_fails() {
        let mut repo = LinkRepository::open(MemoryStorage::disabled());

        add(&mut repo, "Example", "example.com", "", &quiet()).unwrap();

        assert_eq!(repo.len(), 1);
        assert!(!repo.is_persistent());
    }

    #[test]
    fn test_delete_with_skip_confirm() {
        let storage = MemoryStorage::new();
        let mut repo = LinkRepository::open(storage.clone());
        let id = repo.add("Example", "", "example.com").unwrap().value.id;

        // Human output would prompt; the flag skips it
        delete(&mut repo, id, true, &Output::new(OutputFormat::Human)).unwrap();

        assert!(repo.is_empty());
        assert!(LinkRepository::open(storage).is_empty());
    }

    #[test]
    fn test_delete_missing_id_is_ok() {
        let mut repo = LinkRepository::open(MemoryStorage::new());
        repo.add("Example", "", "example.com").unwrap();

        delete(&mut repo, 42, false, &quiet()).unwrap();

        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_search_blank_term_is_ok() {
        let repo = LinkRepository::open(MemoryStorage::new());

        search(&repo, None, &quiet()).unwrap();
        search(&repo, Some("   "), &quiet()).unwrap();
    }

    #[test]
    fn test_open_unknown_id_fails() {
        let repo = LinkRepository::open(MemoryStorage::new());
        assert!(open(&repo, 7, &quiet()).is_err());
    }
}
