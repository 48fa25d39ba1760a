//! The fixed avatar catalog offered at join time.
//!
//! Users pick an avatar by id ("1" to "10"); the join envelope carries the
//! resolved URL, so every client renders the same image.

/// The avatar used when no valid choice was made.
pub const DEFAULT_AVATAR_ID: &str = "1";

const AVATARS: [(&str, &str); 10] = [
    ("1", "https://p1.music.126.net/cl_6SwF57UWPxOzbv2steg==/109951171936425135.jpg"),
    ("2", "https://p1.music.126.net/xNH-pTlvcRmh3U8WJS7JNQ==/109951171825877344.jpg"),
    ("3", "https://p1.music.126.net/PDsODg72ME1sJYAiLW5xDw==/109951170173411821.jpg"),
    ("4", "https://p1.music.126.net/hCIRndMWE4y9qMJ3xjaQsg==/109951170512328679.jpg"),
    ("5", "https://p1.music.126.net/XaeSAXURRaEe5OYAKoPtug==/109951169221164186.jpg"),
    ("6", "https://p1.music.126.net/JlpHimpMHKeTeeVU9XpzXQ==/109951170533289194.jpg"),
    ("7", "https://p1.music.126.net/Jb91HRHEIdMDv8SeK34YTw==/109951171933714711.jpg"),
    ("8", "https://p1.music.126.net/6P5L-GB2Dd_5JxVgWMHLiQ==/109951170514367223.jpg"),
    ("9", "https://p1.music.126.net/vPlsVKWVMkLQOeBFn6HCZw==/109951171315280436.jpg"),
    ("10", "https://p1.music.126.net/US1Ml1rhSTS2AneXsCoYyQ==/109951170921557573.jpg"),
];

/// Looks up the URL for an avatar id.
pub fn avatar_url(id: &str) -> Option<&'static str> {
    AVATARS
        .iter()
        .find(|(avatar_id, _)| *avatar_id == id)
        .map(|(_, url)| *url)
}

/// Every avatar id, in display order.
pub fn avatar_ids() -> impl Iterator<Item = &'static str> {
    AVATARS.iter().map(|(id, _)| *id)
}

/// URL of [`DEFAULT_AVATAR_ID`].
pub fn default_avatar_url() -> &'static str {
    AVATARS[0].1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_id_resolves() {
        assert_eq!(avatar_ids().count(), 10);
        for id in avatar_ids() {
            assert!(avatar_url(id).is_some_and(|url| url.starts_with("https://")));
        }
    }

    #[test]
    fn test_unknown_id_has_no_url() {
        assert_eq!(avatar_url("11"), None);
        assert_eq!(avatar_url(""), None);
    }

    #[test]
    fn test_default_matches_first_entry() {
        assert_eq!(avatar_url(DEFAULT_AVATAR_ID), Some(default_avatar_url()));
    }
}
