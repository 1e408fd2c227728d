//! Apply chosen proposals from a received package file.

use anyhow::Result;
use chrono::{Datelike, Utc};
use std::collections::BTreeMap;
use std::path::Path;

use super::import::review;
use crate::config::Settings;

/// Which proposals to apply, by the numbers `import` printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every proposal.
    All,
    /// Only these (1-based).
    Only(Vec<usize>),
}

/// Parse `N=VALUE`, replacing the proposed value of proposal `N`.
pub fn parse_amendment(value: &str) -> Result<(usize, String), String> {
    let (number, new_value) = value
        .split_once('=')
        .ok_or_else(|| format!("expected N=VALUE, got '{value}'"))?;
    let number = number
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a proposal number", number.trim()))?;
    Ok((number, new_value.to_string()))
}

/// Run the accept command.
///
/// Proposals are re-derived from `file` and applied one at a time, each
/// saved before the next. A failing proposal is reported and skipped.
pub async fn run(
    data_dir: &Path,
    settings: &Settings,
    file: &Path,
    selection: Selection,
    amendments: Vec<(usize, String)>,
) -> Result<()> {
    let (session, proposals) = review(data_dir, settings, file).await?;

    let chosen: Vec<usize> = match selection {
        Selection::All => (1..=proposals.len()).collect(),
        Selection::Only(numbers) => numbers,
    };
    let amendments: BTreeMap<usize, String> = amendments.into_iter().collect();

    for &n in chosen.iter().chain(amendments.keys()) {
        if n == 0 || n > proposals.len() {
            anyhow::bail!(
                "No proposal [{}] ({} available). Run 'monthsync import {}' to list them.",
                n,
                proposals.len(),
                file.display()
            );
        }
    }
    if let Some(n) = amendments.keys().find(|n| !chosen.contains(n)) {
        anyhow::bail!("Proposal [{}] is amended but not selected", n);
    }

    let year = Utc::now().year();
    let mut applied = 0;
    let mut failed = 0;
    for (i, proposal) in proposals.iter().enumerate() {
        let n = i + 1;
        if !chosen.contains(&n) {
            session.discard(proposal).await;
            continue;
        }

        let proposal = match amendments.get(&n) {
            Some(value) => match proposal.with_new_value(value, year) {
                Ok(amended) => amended,
                Err(e) => {
                    eprintln!("  [{n}] not applied: {e}");
                    session.discard(proposal).await;
                    failed += 1;
                    continue;
                }
            },
            None => proposal.clone(),
        };

        match session.accept(&proposal).await {
            Ok(()) => {
                println!("  [{n}] applied: {}", proposal.summary());
                applied += 1;
            }
            Err(e) => {
                eprintln!("  [{n}] not applied: {e}");
                failed += 1;
            }
        }
    }
    session.close().await?;

    println!();
    println!("{applied} applied, {} skipped", proposals.len() - applied - failed);
    if failed > 0 {
        anyhow::bail!("{} proposal(s) could not be applied", failed);
    }
    Ok(())
}
