pub(crate) mod migrate;
pub(crate) mod releases;

use std::sync::Arc;

use url::Url;

use exodus::VersionRule;
use exodus::nforge::{NforgeClient, SourceProject, VcsKind};

use crate::SourceArgs;
use crate::config::Config;

/// Assemble the source project from flags and config.
pub(crate) fn source_project(
    args: &SourceArgs,
    config: &Config,
) -> Result<SourceProject, Box<dyn std::error::Error>> {
    let api_url = args
        .api_url
        .clone()
        .or_else(|| config.source_url())
        .ok_or("a source API URL is required (--api-url, EXODUS_SOURCE_URL, or config)")?;
    let vcs: VcsKind = args.vcs.parse()?;

    Ok(
        SourceProject::new(args.project.clone(), Url::parse(&api_url)?, vcs)
            .with_session_cookie(args.session_cookie.clone().or_else(|| config.source_cookie())),
    )
}

pub(crate) fn source_client() -> Result<NforgeClient, Box<dyn std::error::Error>> {
    Ok(NforgeClient::new()?)
}

/// Default tag rule: the last token of the release name that looks like a
/// version, with any leading `v` stripped; otherwise the whole name with
/// spaces dashed.
pub(crate) fn default_version_rule() -> VersionRule {
    Arc::new(|name: &str| {
        name.split_whitespace()
            .rev()
            .find(|token| {
                token
                    .chars()
                    .next()
                    .map(|c| c == 'v' || c.is_ascii_digit())
                    .unwrap_or(false)
                    && token.chars().any(|c| c.is_ascii_digit())
            })
            .map(|token| token.trim_start_matches('v').to_string())
            .unwrap_or_else(|| name.trim().replace(' ', "-"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_rule_takes_the_trailing_version_token() {
        let rule = default_version_rule();
        assert_eq!(rule.as_ref()("d2coding 1.3.2"), "1.3.2");
        assert_eq!(rule.as_ref()("MyApp v2.0"), "2.0");
        assert_eq!(rule.as_ref()("1.0 hotfix 1.0.1"), "1.0.1");
    }

    #[test]
    fn version_rule_falls_back_to_the_dashed_name() {
        let rule = default_version_rule();
        assert_eq!(rule.as_ref()("first public release"), "first-public-release");
    }
}
