/// Size and head/tail checksum of a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaFingerprint {
    pub size: u64,
    pub hash: u64,
}

impl MediaFingerprint {
    /// Lower-case hex form expected by the catalog, always 16 digits.
    pub fn hash_hex(&self) -> String {
        format!("{:016x}", self.hash)
    }
}

/// Search parameters for one media file. A season or episode of 0 means unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub filename: String,
    pub free_text: String,
    pub season: u32,
    pub episode: u32,
    pub language_code: String,
    pub fingerprint: Option<MediaFingerprint>,
}

/// One subtitle offered by the catalog, in catalog ranking order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCandidate {
    pub title: String,
    pub download_url: String,
    pub language_name: String,
    pub format: String,
}
