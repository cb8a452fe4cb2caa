//! Principal listing

use std::collections::HashSet;

use anyhow::{Context, Result};
use keyturn_common::Principal;
use keyturn_common::defaults::DEFAULT_PAGE_SIZE;
use tracing::debug;

use crate::aws::IamOperations;

/// How many principals to request when listing all of them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxItems {
    /// Follow continuation markers until the provider runs out
    Unbounded,
    /// Request a single page of this size
    Limit(u32),
}

/// Which principals an inventory covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalSelection {
    All(MaxItems),
    Named(String),
}

impl Default for PrincipalSelection {
    fn default() -> Self {
        PrincipalSelection::All(MaxItems::Unbounded)
    }
}

/// Produce the working set of principals.
///
/// A named selection is a point lookup; a missing principal is an error.
/// Any page failure aborts the listing. Names repeated across pages are
/// kept once, first occurrence wins.
pub async fn list_principals<I: IamOperations>(
    iam: &I,
    selection: &PrincipalSelection,
) -> Result<Vec<Principal>> {
    let max = match selection {
        PrincipalSelection::Named(name) => {
            let principal = iam
                .get_principal(name)
                .await
                .with_context(|| format!("Failed to look up principal {name}"))?;
            return Ok(vec![principal]);
        }
        PrincipalSelection::All(max) => *max,
    };

    let page_size = match max {
        MaxItems::Unbounded => DEFAULT_PAGE_SIZE,
        MaxItems::Limit(n) => n,
    };

    let mut seen = HashSet::new();
    let mut principals = Vec::new();
    let mut marker: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = iam
            .list_principals_page(page_size, marker.take())
            .await
            .context("Failed to list principals")?;
        pages += 1;

        for principal in page.principals {
            if seen.insert(principal.name.clone()) {
                principals.push(principal);
            } else {
                debug!(principal = %principal.name, "Dropping duplicate principal from listing");
            }
        }

        match (max, page.marker) {
            (MaxItems::Unbounded, Some(next)) if page.is_truncated => marker = Some(next),
            _ => break,
        }
    }

    debug!(count = principals.len(), pages, "Listed principals");
    Ok(principals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeIam};

    fn names(principals: &[Principal]) -> Vec<&str> {
        principals.iter().map(|p| p.name.as_str()).collect()
    }

    fn many_users(n: usize) -> FakeIam {
        (0..n).fold(FakeIam::new(), |fake, i| fake.user(&format!("user-{i:03}")))
    }

    #[tokio::test]
    async fn unbounded_follows_every_page() {
        let fake = many_users(120);
        let principals = list_principals(&fake, &PrincipalSelection::All(MaxItems::Unbounded))
            .await
            .unwrap();

        assert_eq!(principals.len(), 120);
        let pages: Vec<_> = fake
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::ListPrincipals { .. }))
            .collect();
        assert_eq!(pages.len(), 3);
        assert_eq!(
            pages[0],
            Call::ListPrincipals {
                max_items: DEFAULT_PAGE_SIZE,
                marker: None
            }
        );
    }

    #[tokio::test]
    async fn limit_requests_a_single_page() {
        let fake = many_users(120);
        let principals = list_principals(&fake, &PrincipalSelection::All(MaxItems::Limit(7)))
            .await
            .unwrap();

        assert_eq!(principals.len(), 7);
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn named_bypasses_pagination() {
        let fake = many_users(3);
        let principals =
            list_principals(&fake, &PrincipalSelection::Named("user-001".to_string()))
                .await
                .unwrap();

        assert_eq!(names(&principals), vec!["user-001"]);
        assert_eq!(fake.calls(), vec![Call::GetPrincipal("user-001".to_string())]);
    }

    #[tokio::test]
    async fn named_missing_principal_is_an_error() {
        let fake = many_users(1);
        let err = list_principals(&fake, &PrincipalSelection::Named("ghost".to_string()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn page_failure_aborts_listing() {
        let fake = many_users(5).fail_pages();
        let result = list_principals(&fake, &PrincipalSelection::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn duplicates_across_pages_are_dropped() {
        let fake = many_users(75).duplicate_across_pages();
        let principals = list_principals(&fake, &PrincipalSelection::default())
            .await
            .unwrap();

        assert_eq!(principals.len(), 75);
        let unique: HashSet<_> = principals.iter().map(|p| &p.name).collect();
        assert_eq!(unique.len(), 75);
    }

    #[tokio::test]
    async fn empty_account() {
        let fake = FakeIam::new();
        let principals = list_principals(&fake, &PrincipalSelection::default())
            .await
            .unwrap();
        assert!(principals.is_empty());
    }
}
