//! Review a received package file without changing anything.

use anyhow::{Context, Result};
use monthsync_core::{sort_for_display, PendingUpdate};
use std::path::Path;

use super::{open_session, FileSession};
use crate::config::Settings;
use crate::transport::FileTransport;

/// Receive `file` and diff it against the local calendar.
///
/// Proposals come back in display order; `import` and `accept` number
/// them the same way as long as neither the file nor the calendar changed.
pub async fn review(
    data_dir: &Path,
    settings: &Settings,
    file: &Path,
) -> Result<(FileSession, Vec<PendingUpdate>)> {
    let session = open_session(data_dir, settings, FileTransport::inbox(file), file).await?;
    let mut proposals = session
        .receive_proposals()
        .await
        .with_context(|| format!("Rejected {}", file.display()))?;
    sort_for_display(&mut proposals);
    Ok((session, proposals))
}

/// Run the import command.
pub async fn run(data_dir: &Path, settings: &Settings, file: &Path) -> Result<()> {
    let (session, proposals) = review(data_dir, settings, file).await?;
    session.close().await?;

    if proposals.is_empty() {
        println!("Calendars already match. Nothing to review.");
        return Ok(());
    }

    println!("{} proposed change(s):", proposals.len());
    println!();
    for (i, proposal) in proposals.iter().enumerate() {
        println!("  [{}] {}", i + 1, proposal.summary());
    }
    println!();
    println!("Apply with: monthsync accept {} --all", file.display());
    println!("        or: monthsync accept {} --only 1 3", file.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{edit, export, init};
    use monthsync_core::{CalendarStore, ProposalKind};
    use tempfile::{tempdir, TempDir};

    async fn exported(events: &[(i32, i32, &str, &str)]) -> (TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        init::run(dir.path(), "Phone").await.unwrap();
        for (month, day, title, location) in events {
            edit::set(dir.path(), *month, *day, title, location).await.unwrap();
        }
        let file = dir.path().join("phone.json");
        export::run(dir.path(), &Settings::default(), &file).await.unwrap();
        (dir, file)
    }

    #[tokio::test]
    async fn review_lists_new_events_and_field_changes() {
        let (_remote, file) =
            exported(&[(4, 22, "Earth Day Festival", "Park"), (6, 1, "Picnic", "Lake")]).await;

        let local = tempdir().unwrap();
        init::run(local.path(), "Laptop").await.unwrap();
        edit::set(local.path(), 4, 22, "Earth Day", "Park").await.unwrap();

        let (_session, proposals) = review(local.path(), &Settings::default(), &file)
            .await
            .unwrap();

        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].month, 4);
        assert_eq!(proposals[0].kind(), ProposalKind::FieldChange);
        assert_eq!(proposals[0].new_value(), "Earth Day Festival");
        assert_eq!(proposals[1].month, 6);
        assert_eq!(proposals[1].kind(), ProposalKind::NewEvent);
        assert_eq!(proposals[1].source_device_name, "Phone");
    }

    #[tokio::test]
    async fn import_leaves_calendar_untouched() {
        let (_remote, file) = exported(&[(8, 15, "Fair", "Grounds")]).await;

        let local = tempdir().unwrap();
        init::run(local.path(), "Laptop").await.unwrap();
        run(local.path(), &Settings::default(), &file).await.unwrap();

        let calendar = crate::store::FileCalendar::open(local.path()).unwrap();
        assert!(!calendar.get_event(8).unwrap().is_scheduled());
    }

    #[tokio::test]
    async fn corrupt_file_rejected() {
        let local = tempdir().unwrap();
        init::run(local.path(), "Laptop").await.unwrap();
        let file = local.path().join("garbage.json");
        std::fs::write(&file, b"{ not a package").unwrap();

        let err = run(local.path(), &Settings::default(), &file).await.unwrap_err();
        assert!(err.to_string().contains("Rejected"));
    }

    #[tokio::test]
    async fn missing_file_rejected() {
        let local = tempdir().unwrap();
        init::run(local.path(), "Laptop").await.unwrap();
        let file = local.path().join("absent.json");

        assert!(run(local.path(), &Settings::default(), &file).await.is_err());
    }
}
