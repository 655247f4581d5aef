use crate::lookup::LookupResult;

/// Shown when a provider could not be queried at all.
pub const UNAVAILABLE: &str = "lookup unavailable";

/// What a provider contributed to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(String),
    NotFound,
    Unavailable,
}

impl From<LookupResult> for LookupOutcome {
    fn from(result: LookupResult) -> Self {
        match result {
            LookupResult::Found(url) => LookupOutcome::Found(url),
            LookupResult::NotFound => LookupOutcome::NotFound,
        }
    }
}

impl LookupOutcome {
    fn as_text(&self) -> &str {
        match self {
            LookupOutcome::Found(url) => url,
            LookupOutcome::NotFound => LookupResult::NotFound.as_text(),
            LookupOutcome::Unavailable => UNAVAILABLE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderResult {
    pub provider: &'static str,
    pub outcome: LookupOutcome,
}

pub fn format_reply(video: &ProviderResult, track: &ProviderResult) -> String {
    format!(
        "[{}] {}\n[{}] {}",
        video.provider,
        video.outcome.as_text(),
        track.provider,
        track.outcome.as_text()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(provider: &'static str, outcome: LookupOutcome) -> ProviderResult {
        ProviderResult { provider, outcome }
    }

    #[test]
    fn test_both_found() {
        let reply = format_reply(
            &result(
                "Youtube",
                LookupOutcome::Found("https://www.youtube.com/watch?v=abc".to_string()),
            ),
            &result(
                "Spotify",
                LookupOutcome::Found("https://open.spotify.com/track/xyz".to_string()),
            ),
        );
        assert_eq!(
            reply,
            "[Youtube] https://www.youtube.com/watch?v=abc\n[Spotify] https://open.spotify.com/track/xyz"
        );
    }

    #[test]
    fn test_not_found_uses_sentinel() {
        let reply = format_reply(
            &result("Youtube", LookupOutcome::NotFound),
            &result("Spotify", LookupOutcome::NotFound),
        );
        assert_eq!(reply, "[Youtube] No content found\n[Spotify] No content found");
    }

    #[test]
    fn test_unavailable() {
        let reply = format_reply(
            &result("Youtube", LookupOutcome::Unavailable),
            &result("Spotify", LookupOutcome::NotFound),
        );
        assert_eq!(reply.lines().next(), Some("[Youtube] lookup unavailable"));
        assert_eq!(reply.lines().count(), 2);
    }

    #[test]
    fn test_from_lookup_result() {
        assert_eq!(
            LookupOutcome::from(LookupResult::Found("u".to_string())),
            LookupOutcome::Found("u".to_string())
        );
        assert_eq!(
            LookupOutcome::from(LookupResult::NotFound),
            LookupOutcome::NotFound
        );
    }
}
