//! Rendition catalog: the view model behind the widget's format grid.
//!
//! Pure data transformation, no network and no mutable state. Ordering is
//! load-bearing: cards keep the (video, then format) order of the
//! extraction result because `video_index` is positional and is sent back
//! verbatim on download.

use serde::Serialize;

use crate::widget::extract::{ExtractionResult, FormatVariant};

/// One selectable rendition card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenditionCard {
    pub thumbnail: String,
    pub quality_label: String,
    pub format_tag: Option<String>,
    pub size_label: Option<String>,
    /// 1-based index of the source video this card belongs to
    pub video_index: usize,
    pub source_url: String,
}

impl RenditionCard {
    /// First whitespace-delimited token of the label, the canonical quality
    /// identifier the download operation expects.
    pub fn quality_token(&self) -> &str {
        self.quality_label
            .split_whitespace()
            .next()
            .unwrap_or(self.quality_label.as_str())
    }
}

fn nonzero(value: Option<u32>) -> Option<u32> {
    value.filter(|&v| v > 0)
}

/// Label override: when both dimensions are known the label becomes
/// "{height}p ({width}x{height})"; otherwise the extractor's free-form
/// quality string is kept as-is. Zero dimensions count as unknown.
fn quality_label(variant: &FormatVariant) -> String {
    match (nonzero(variant.width), nonzero(variant.height)) {
        (Some(width), Some(height)) => format!("{}p ({}x{})", height, width, height),
        _ => variant.quality.clone(),
    }
}

/// Flattens an extraction result into the ordered list of rendition cards.
pub fn build_catalog(result: &ExtractionResult, source_url: &str) -> Vec<RenditionCard> {
    let mut cards = Vec::new();
    for (index, video) in result.videos.iter().enumerate() {
        for variant in &video.video_formats {
            cards.push(RenditionCard {
                thumbnail: video.thumbnail.clone(),
                quality_label: quality_label(variant),
                format_tag: variant.format.clone(),
                size_label: variant.filesize.clone(),
                video_index: index + 1,
                source_url: source_url.to_string(),
            });
        }
    }
    cards
}

/// One-line tweet summary for surfaces that show it above the grid:
/// title, uploader and the first video's whole-second duration.
pub fn tweet_summary(result: &ExtractionResult) -> String {
    let title = result
        .tweet_info
        .as_ref()
        .and_then(|info| info.title.as_deref())
        .unwrap_or("Unknown");

    let mut summary = title.to_string();
    if let Some(uploader) = result
        .tweet_info
        .as_ref()
        .and_then(|info| info.uploader.as_deref())
        .filter(|uploader| !uploader.is_empty())
    {
        summary.push_str(&format!(" | By: {}", uploader));
    }
    if let Some(duration) = result.videos.first().and_then(|video| video.duration) {
        if duration > 0.0 {
            summary.push_str(&format!(" | Duration: {}s", duration.floor() as u64));
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::extract::{SourceVideo, TweetInfo};
    use pretty_assertions::assert_eq;

    fn variant(quality: &str, width: Option<u32>, height: Option<u32>) -> FormatVariant {
        FormatVariant {
            quality: quality.to_string(),
            width,
            height,
            format: None,
            filesize: None,
        }
    }

    fn result(videos: Vec<SourceVideo>) -> ExtractionResult {
        ExtractionResult {
            tweet_info: None,
            videos,
        }
    }

    #[test]
    fn test_catalog_flattens_in_stable_order_with_positional_indices() {
        let extraction = result(vec![
            SourceVideo {
                thumbnail: "thumb1".to_string(),
                duration: Some(9.0),
                video_formats: vec![variant("360p", None, None), variant("720p", None, None)],
            },
            SourceVideo {
                thumbnail: "thumb2".to_string(),
                duration: None,
                video_formats: vec![variant("480p", None, None)],
            },
        ]);

        let cards = build_catalog(&extraction, "https://x.com/u/status/1");
        assert_eq!(cards.len(), 3);
        assert_eq!(
            cards.iter().map(|c| c.quality_label.as_str()).collect::<Vec<_>>(),
            vec!["360p", "720p", "480p"]
        );
        assert_eq!(cards.iter().map(|c| c.video_index).collect::<Vec<_>>(), vec![1, 1, 2]);
        assert_eq!(cards[0].thumbnail, "thumb1");
        assert_eq!(cards[2].thumbnail, "thumb2");
        assert!(cards.iter().all(|c| c.source_url == "https://x.com/u/status/1"));
    }

    #[test]
    fn test_quality_label_override_when_dimensions_known() {
        let extraction = result(vec![SourceVideo {
            thumbnail: String::new(),
            duration: None,
            video_formats: vec![
                variant("http-720", Some(1280), Some(720)),
                variant("best", None, None),
                variant("odd", Some(0), Some(720)),
            ],
        }]);

        let cards = build_catalog(&extraction, "u");
        assert_eq!(cards[0].quality_label, "720p (1280x720)");
        // no dimensions: original label kept unchanged
        assert_eq!(cards[1].quality_label, "best");
        // zero width counts as unknown
        assert_eq!(cards[2].quality_label, "odd");
    }

    #[test]
    fn test_quality_token_is_first_whitespace_token() {
        let extraction = result(vec![SourceVideo {
            thumbnail: String::new(),
            duration: None,
            video_formats: vec![variant("quick", Some(1920), Some(1080))],
        }]);

        let cards = build_catalog(&extraction, "u");
        assert_eq!(cards[0].quality_label, "1080p (1920x1080)");
        assert_eq!(cards[0].quality_token(), "1080p");
    }

    #[test]
    fn test_empty_extraction_yields_empty_catalog() {
        assert!(build_catalog(&result(vec![]), "u").is_empty());
    }

    #[test]
    fn test_tweet_summary() {
        let mut extraction = result(vec![SourceVideo {
            thumbnail: String::new(),
            duration: Some(42.9),
            video_formats: vec![],
        }]);
        extraction.tweet_info = Some(TweetInfo {
            title: Some("Clip of the day".to_string()),
            uploader: Some("someone".to_string()),
        });
        assert_eq!(tweet_summary(&extraction), "Clip of the day | By: someone | Duration: 42s");

        let bare = result(vec![]);
        assert_eq!(tweet_summary(&bare), "Unknown");
    }
}
