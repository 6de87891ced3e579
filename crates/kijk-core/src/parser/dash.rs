//! DASH manifest parser
//!
//! Expands an MPD document into one [`Format`] per video or audio
//! representation, walking Period > AdaptationSet > Representation in
//! document order. Segment templates, timelines and lists are expanded
//! into absolute fragment URLs.

use regex::{Captures, Regex};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::error::{KijkError, Result};
use crate::types::{Format, Fragment};

/// Protocol reported for segmented DASH formats
pub const DASH_PROTOCOL: &str = "http_dash_segments";

/// Upper bound on segments expanded for a single representation
pub const MAX_SEGMENTS: usize = 100_000;

const TEMPLATE_PATTERN: &str = r"\$(?:(RepresentationID|Bandwidth|Number|Time)(?:%0(\d+)d)?)?\$";

const DURATION_PATTERN: &str = r"^P(?:(\d+(?:\.\d+)?)D)?(?:T(?:(\d+(?:\.\d+)?)H)?(?:(\d+(?:\.\d+)?)M)?(?:(\d+(?:\.\d+)?)S)?)?$";

#[derive(Debug, Deserialize)]
struct Mpd {
    #[serde(rename = "@mediaPresentationDuration")]
    media_presentation_duration: Option<String>,
    #[serde(rename = "BaseURL", default)]
    base_urls: Vec<BaseUrl>,
    #[serde(rename = "Period", default)]
    periods: Vec<Period>,
}

#[derive(Debug, Deserialize)]
struct BaseUrl {
    #[serde(rename = "$text", default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct Period {
    #[serde(rename = "@duration")]
    duration: Option<String>,
    #[serde(rename = "BaseURL", default)]
    base_urls: Vec<BaseUrl>,
    #[serde(rename = "SegmentTemplate")]
    segment_template: Option<SegmentTemplate>,
    #[serde(rename = "SegmentList")]
    segment_list: Option<SegmentList>,
    #[serde(rename = "AdaptationSet", default)]
    adaptation_sets: Vec<AdaptationSet>,
}

#[derive(Debug, Deserialize)]
struct AdaptationSet {
    #[serde(rename = "@mimeType")]
    mime_type: Option<String>,
    #[serde(rename = "@contentType")]
    content_type: Option<String>,
    #[serde(rename = "@lang")]
    lang: Option<String>,
    #[serde(rename = "@codecs")]
    codecs: Option<String>,
    #[serde(rename = "@frameRate")]
    frame_rate: Option<String>,
    #[serde(rename = "@audioSamplingRate")]
    audio_sampling_rate: Option<String>,
    #[serde(rename = "BaseURL", default)]
    base_urls: Vec<BaseUrl>,
    #[serde(rename = "SegmentTemplate")]
    segment_template: Option<SegmentTemplate>,
    #[serde(rename = "SegmentList")]
    segment_list: Option<SegmentList>,
    #[serde(rename = "Representation", default)]
    representations: Vec<Representation>,
}

#[derive(Debug, Deserialize)]
struct Representation {
    #[serde(rename = "@id")]
    id: Option<String>,
    #[serde(rename = "@mimeType")]
    mime_type: Option<String>,
    #[serde(rename = "@codecs")]
    codecs: Option<String>,
    #[serde(rename = "@bandwidth")]
    bandwidth: Option<u64>,
    #[serde(rename = "@width")]
    width: Option<u32>,
    #[serde(rename = "@height")]
    height: Option<u32>,
    #[serde(rename = "@frameRate")]
    frame_rate: Option<String>,
    #[serde(rename = "@audioSamplingRate")]
    audio_sampling_rate: Option<String>,
    #[serde(rename = "BaseURL", default)]
    base_urls: Vec<BaseUrl>,
    #[serde(rename = "SegmentTemplate")]
    segment_template: Option<SegmentTemplate>,
    #[serde(rename = "SegmentList")]
    segment_list: Option<SegmentList>,
}

/// May appear on Period, AdaptationSet and Representation; the innermost
/// attribute wins
#[derive(Debug, Clone, Deserialize)]
struct SegmentTemplate {
    #[serde(rename = "@media")]
    media: Option<String>,
    #[serde(rename = "@initialization")]
    initialization: Option<String>,
    #[serde(rename = "@startNumber")]
    start_number: Option<u64>,
    #[serde(rename = "@timescale")]
    timescale: Option<u64>,
    #[serde(rename = "@duration")]
    duration: Option<u64>,
    #[serde(rename = "SegmentTimeline")]
    timeline: Option<SegmentTimeline>,
}

#[derive(Debug, Clone, Deserialize)]
struct SegmentTimeline {
    #[serde(rename = "S", default)]
    segments: Vec<TimelineSegment>,
}

#[derive(Debug, Clone, Deserialize)]
struct TimelineSegment {
    #[serde(rename = "@t")]
    time: Option<u64>,
    #[serde(rename = "@d")]
    duration: u64,
    /// -1 repeats up to the next `t` or the end of the period
    #[serde(rename = "@r")]
    repeat: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SegmentList {
    #[serde(rename = "@timescale")]
    timescale: Option<u64>,
    #[serde(rename = "@duration")]
    duration: Option<u64>,
    #[serde(rename = "Initialization")]
    initialization: Option<Initialization>,
    #[serde(rename = "SegmentURL", default)]
    segment_urls: Vec<SegmentUrl>,
}

#[derive(Debug, Deserialize)]
struct Initialization {
    #[serde(rename = "@sourceURL")]
    source_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SegmentUrl {
    #[serde(rename = "@media")]
    media: Option<String>,
}

impl SegmentTemplate {
    /// Fills attributes missing on `self` from `parent`
    fn inherit(&self, parent: &SegmentTemplate) -> SegmentTemplate {
        SegmentTemplate {
            media: self.media.clone().or_else(|| parent.media.clone()),
            initialization: self
                .initialization
                .clone()
                .or_else(|| parent.initialization.clone()),
            start_number: self.start_number.or(parent.start_number),
            timescale: self.timescale.or(parent.timescale),
            duration: self.duration.or(parent.duration),
            timeline: self.timeline.clone().or_else(|| parent.timeline.clone()),
        }
    }
}

fn merge_templates(
    parent: Option<&SegmentTemplate>,
    child: Option<&SegmentTemplate>,
) -> Option<SegmentTemplate> {
    match (parent, child) {
        (Some(parent), Some(child)) => Some(child.inherit(parent)),
        (parent, child) => child.or(parent).cloned(),
    }
}

/// Per-representation values for `$Identifier$` substitution
struct TemplateContext<'a> {
    pattern: &'a Regex,
    representation_id: &'a str,
    bandwidth: Option<u64>,
}

impl TemplateContext<'_> {
    /// Substitutes identifiers in a segment template
    ///
    /// `$$` becomes a literal `$`. `%0Nd` pads numeric values to N digits.
    /// Identifiers without a value are left untouched.
    fn expand(&self, template: &str, number: Option<u64>, time: Option<u64>) -> String {
        self.pattern
            .replace_all(template, |caps: &Captures| {
                let value = match caps.get(1).map(|m| m.as_str()) {
                    None => return "$".to_string(),
                    Some("RepresentationID") => return self.representation_id.to_string(),
                    Some("Bandwidth") => self.bandwidth,
                    Some("Number") => number,
                    Some("Time") => time,
                    Some(_) => None,
                };
                match value {
                    Some(value) => {
                        let width = caps
                            .get(2)
                            .and_then(|w| w.as_str().parse::<usize>().ok())
                            .unwrap_or(0);
                        format!("{:0width$}", value, width = width)
                    }
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

/// Parses an MPD document into playable formats
///
/// # Arguments
/// * `xml` - Manifest document text
/// * `manifest_url` - URL the manifest was fetched from, used to resolve BaseURLs
/// * `video_id` - Item id, only used for logging
///
/// # Returns
/// Formats in document order. Adaptation sets that are neither video nor
/// audio (subtitles, thumbnails) are skipped. Representations with a
/// segment template or list carry their fragments and report
/// [`DASH_PROTOCOL`]; single-file representations report the URL scheme.
///
/// # Errors
/// Returns `ParseError` for malformed XML, unresolvable URLs or more than
/// [`MAX_SEGMENTS`] segments in one representation
pub fn parse_mpd_formats(xml: &str, manifest_url: &str, video_id: &str) -> Result<Vec<Format>> {
    let mpd: Mpd = quick_xml::de::from_str(xml)?;
    let manifest_base = Url::parse(manifest_url)
        .map_err(|e| KijkError::ParseError(format!("invalid manifest URL {}: {}", manifest_url, e)))?;
    let mpd_base = resolve_base(&manifest_base, &mpd.base_urls)?;
    let mpd_duration = mpd.media_presentation_duration.as_deref().and_then(parse_duration);
    let pattern = Regex::new(TEMPLATE_PATTERN)
        .map_err(|e| KijkError::ParseError(format!("Invalid template pattern: {}", e)))?;

    let mut formats = Vec::new();

    for period in &mpd.periods {
        let period_base = resolve_base(&mpd_base, &period.base_urls)?;
        let period_duration = period
            .duration
            .as_deref()
            .and_then(parse_duration)
            .or(mpd_duration);

        for adaptation in &period.adaptation_sets {
            let adaptation_base = resolve_base(&period_base, &adaptation.base_urls)?;
            let adaptation_template = merge_templates(
                period.segment_template.as_ref(),
                adaptation.segment_template.as_ref(),
            );

            for representation in &adaptation.representations {
                let mime_type = representation
                    .mime_type
                    .as_deref()
                    .or(adaptation.mime_type.as_deref());
                let content_type = mime_type
                    .and_then(|m| m.split('/').next())
                    .or(adaptation.content_type.as_deref())
                    .unwrap_or_default();

                if content_type != "video" && content_type != "audio" {
                    debug!(
                        video_id,
                        content_type,
                        representation = ?representation.id,
                        "skipping non audio/video representation"
                    );
                    continue;
                }

                let url = resolve_base(&adaptation_base, &representation.base_urls)?;
                let codecs = representation
                    .codecs
                    .clone()
                    .or_else(|| adaptation.codecs.clone());
                let (vcodec, acodec) = if content_type == "video" {
                    (codecs, Some("none".to_string()))
                } else {
                    (Some("none".to_string()), codecs)
                };

                let context = TemplateContext {
                    pattern: &pattern,
                    representation_id: representation.id.as_deref().unwrap_or_default(),
                    bandwidth: representation.bandwidth,
                };
                let template = merge_templates(
                    adaptation_template.as_ref(),
                    representation.segment_template.as_ref(),
                );
                let segment_list = representation
                    .segment_list
                    .as_ref()
                    .or(adaptation.segment_list.as_ref())
                    .or(period.segment_list.as_ref());

                let fragments = match (&template, segment_list) {
                    (Some(template), _) => {
                        template_fragments(template, &url, &context, period_duration)?
                    }
                    (None, Some(list)) => list_fragments(list, &url)?,
                    (None, None) => Vec::new(),
                };
                let protocol = if fragments.is_empty() {
                    url.scheme().to_string()
                } else {
                    DASH_PROTOCOL.to_string()
                };

                let format_id = match &representation.id {
                    Some(id) => id.clone(),
                    None => format!("dash-{}", formats.len()),
                };

                formats.push(Format {
                    format_id,
                    url: url.to_string(),
                    manifest_url: manifest_url.to_string(),
                    ext: container_ext(content_type, mime_type),
                    protocol,
                    fragments,
                    width: representation.width,
                    height: representation.height,
                    tbr: representation.bandwidth.map(|b| b as f64 / 1000.0),
                    fps: representation
                        .frame_rate
                        .as_deref()
                        .or(adaptation.frame_rate.as_deref())
                        .and_then(parse_frame_rate),
                    vcodec,
                    acodec,
                    asr: representation
                        .audio_sampling_rate
                        .as_deref()
                        .or(adaptation.audio_sampling_rate.as_deref())
                        .and_then(|r| r.trim().parse().ok()),
                    language: adaptation.lang.clone(),
                });
            }
        }
    }

    debug!(video_id, manifest_url, count = formats.len(), "expanded DASH manifest");
    Ok(formats)
}

/// Expands a segment template into the init segment plus media segments
///
/// Returns no fragments when the template lacks `@media`, or when neither
/// a timeline nor a fixed duration with a known period length is given.
fn template_fragments(
    template: &SegmentTemplate,
    base: &Url,
    context: &TemplateContext<'_>,
    period_duration: Option<f64>,
) -> Result<Vec<Fragment>> {
    let Some(media) = template.media.as_deref() else {
        return Ok(Vec::new());
    };
    let timescale = template.timescale.filter(|t| *t > 0).unwrap_or(1) as f64;
    let mut number = template.start_number.unwrap_or(1);
    let mut segments = Vec::new();

    if let Some(timeline) = &template.timeline {
        let period_end = period_duration.map(|d| d * timescale);
        let mut time = 0u64;

        for (i, segment) in timeline.segments.iter().enumerate() {
            if let Some(t) = segment.time {
                time = t;
            }
            let repeat = match segment.repeat {
                Some(r) if r < 0 => {
                    let end = timeline
                        .segments
                        .get(i + 1)
                        .and_then(|next| next.time)
                        .map(|t| t as f64)
                        .or(period_end);
                    match end {
                        Some(end) if segment.duration > 0 => {
                            ((end - time as f64) / segment.duration as f64).ceil() as i64 - 1
                        }
                        _ => 0,
                    }
                }
                Some(r) => r,
                None => 0,
            };

            for _ in 0..=repeat.max(0) {
                check_segment_count(segments.len())?;
                segments.push(Fragment {
                    url: join_segment(base, &context.expand(media, Some(number), Some(time)))?,
                    duration: Some(segment.duration as f64 / timescale),
                });
                time = time.saturating_add(segment.duration);
                number += 1;
            }
        }
    } else if let (Some(duration), Some(total)) =
        (template.duration.filter(|d| *d > 0), period_duration)
    {
        let segment_duration = duration as f64 / timescale;
        let count = (total / segment_duration).ceil() as u64;
        let mut time = 0u64;

        for _ in 0..count {
            check_segment_count(segments.len())?;
            segments.push(Fragment {
                url: join_segment(base, &context.expand(media, Some(number), Some(time)))?,
                duration: Some(segment_duration),
            });
            time = time.saturating_add(duration);
            number += 1;
        }
    }

    if segments.is_empty() {
        return Ok(Vec::new());
    }

    let mut fragments = Vec::with_capacity(segments.len() + 1);
    if let Some(init) = template.initialization.as_deref() {
        fragments.push(Fragment {
            url: join_segment(base, &context.expand(init, None, None))?,
            duration: None,
        });
    }
    fragments.extend(segments);
    Ok(fragments)
}

/// Lists the init segment and every `SegmentURL`
fn list_fragments(list: &SegmentList, base: &Url) -> Result<Vec<Fragment>> {
    let timescale = list.timescale.filter(|t| *t > 0).unwrap_or(1) as f64;
    let duration = list.duration.map(|d| d as f64 / timescale);

    if list.segment_urls.len() > MAX_SEGMENTS {
        return Err(too_many_segments());
    }

    let mut fragments = Vec::with_capacity(list.segment_urls.len() + 1);
    if let Some(init) = list.initialization.as_ref().and_then(|i| i.source_url.as_deref()) {
        fragments.push(Fragment {
            url: join_segment(base, init)?,
            duration: None,
        });
    }
    for segment in &list.segment_urls {
        let url = match segment.media.as_deref() {
            Some(media) => join_segment(base, media)?,
            None => base.to_string(),
        };
        fragments.push(Fragment { url, duration });
    }
    Ok(fragments)
}

fn join_segment(base: &Url, path: &str) -> Result<String> {
    base.join(path)
        .map(|url| url.to_string())
        .map_err(|e| KijkError::ParseError(format!("invalid segment URL {}: {}", path, e)))
}

fn check_segment_count(count: usize) -> Result<()> {
    if count >= MAX_SEGMENTS {
        return Err(too_many_segments());
    }
    Ok(())
}

fn too_many_segments() -> KijkError {
    KijkError::ParseError(format!(
        "DASH representation lists more than {} segments",
        MAX_SEGMENTS
    ))
}

/// Parses an ISO 8601 duration such as "PT1H30M" or "PT634.566S" into seconds
///
/// Year and month designators are not supported.
fn parse_duration(duration: &str) -> Option<f64> {
    let re = Regex::new(DURATION_PATTERN).ok()?;
    let caps = re.captures(duration.trim())?;
    let part = |i: usize, scale: f64| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map_or(0.0, |v| v * scale)
    };
    Some(part(1, 86_400.0) + part(2, 3_600.0) + part(3, 60.0) + part(4, 1.0))
}

/// Resolves the first BaseURL (if any) against `parent`
fn resolve_base(parent: &Url, base_urls: &[BaseUrl]) -> Result<Url> {
    match base_urls.first().map(|b| b.url.trim()).filter(|u| !u.is_empty()) {
        Some(base) => parent
            .join(base)
            .map_err(|e| KijkError::ParseError(format!("invalid BaseURL {}: {}", base, e))),
        None => Ok(parent.clone()),
    }
}

/// Picks the container extension for a representation
fn container_ext(content_type: &str, mime_type: Option<&str>) -> String {
    let subtype = mime_type.and_then(|m| m.split('/').nth(1)).unwrap_or("mp4");
    match (content_type, subtype) {
        ("audio", "mp4") => "m4a".to_string(),
        (_, subtype) => subtype.to_string(),
    }
}

/// Parses "25" or "30000/1001"
fn parse_frame_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => rate.trim().parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST_URL: &str = "https://cdn.example/vod/CQvs74EAaJj/manifest.mpd";

    const MPD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" type="static" mediaPresentationDuration="PT10S">
  <Period id="0">
    <AdaptationSet mimeType="video/mp4" frameRate="25" segmentAlignment="true">
      <SegmentTemplate timescale="1000" duration="2000" media="$RepresentationID$/$Number$.m4s" initialization="$RepresentationID$/init.mp4"/>
      <Representation id="video=400000" bandwidth="400000" width="640" height="360" codecs="avc1.4D401E"/>
      <Representation id="video=2500000" bandwidth="2500000" width="1280" height="720" codecs="avc1.4D401F"/>
    </AdaptationSet>
    <AdaptationSet mimeType="audio/mp4" lang="nl" codecs="mp4a.40.2">
      <Representation id="audio=128000" bandwidth="128000" audioSamplingRate="48000">
        <BaseURL>audio/track.mp4</BaseURL>
      </Representation>
    </AdaptationSet>
    <AdaptationSet mimeType="text/vtt" lang="nl">
      <Representation id="textstream_nl=1000" bandwidth="1000"/>
    </AdaptationSet>
  </Period>
</MPD>"#;

    /// Unified Streaming layout: templates and sampling rate on the adaptation set
    const USP_MPD: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" type="static" mediaPresentationDuration="PT8S" profiles="urn:mpeg:dash:profile:isoff-live:2011">
  <Period id="1" duration="PT8S">
    <BaseURL>dash/</BaseURL>
    <AdaptationSet id="1" group="1" contentType="audio" lang="nl" segmentAlignment="true" audioSamplingRate="48000" mimeType="audio/mp4" codecs="mp4a.40.2" startWithSAP="1">
      <AudioChannelConfiguration schemeIdUri="urn:mpeg:dash:23003:3:audio_channel_configuration:2011" value="2"/>
      <Role schemeIdUri="urn:mpeg:dash:role:2011" value="main"/>
      <SegmentTemplate timescale="48000" initialization="CQvs74EAaJj-$RepresentationID$.dash" media="CQvs74EAaJj-$RepresentationID$-$Time$.dash">
        <SegmentTimeline>
          <S t="0" d="192000" r="1"/>
        </SegmentTimeline>
      </SegmentTemplate>
      <Representation id="audio=128000" bandwidth="128000"/>
    </AdaptationSet>
    <AdaptationSet id="2" group="2" contentType="video" par="16:9" segmentAlignment="true" mimeType="video/mp4" frameRate="25" startWithSAP="1">
      <SegmentTemplate timescale="600" initialization="CQvs74EAaJj-$RepresentationID$.dash" media="CQvs74EAaJj-$RepresentationID$-$Time$.dash">
        <SegmentTimeline>
          <S t="0" d="2400" r="-1"/>
        </SegmentTimeline>
      </SegmentTemplate>
      <Representation id="video=400000" bandwidth="400000" width="640" height="360" codecs="avc1.4D401E" scanType="progressive"/>
      <Representation id="video=3000000" bandwidth="3000000" width="1280" height="720" codecs="avc1.640020" scanType="progressive"/>
    </AdaptationSet>
  </Period>
</MPD>"#;

    fn context(pattern: &Regex) -> TemplateContext<'_> {
        TemplateContext {
            pattern,
            representation_id: "video=400000",
            bandwidth: Some(400000),
        }
    }

    #[test]
    fn test_parse_mpd_formats() {
        let formats = parse_mpd_formats(MPD, MANIFEST_URL, "CQvs74EAaJj").unwrap();
        assert_eq!(formats.len(), 3);

        let low = &formats[0];
        assert_eq!(low.format_id, "video=400000");
        assert_eq!(low.ext, "mp4");
        assert_eq!(low.protocol, DASH_PROTOCOL);
        assert_eq!(low.width, Some(640));
        assert_eq!(low.height, Some(360));
        assert_eq!(low.tbr, Some(400.0));
        assert_eq!(low.fps, Some(25.0));
        assert_eq!(low.vcodec.as_deref(), Some("avc1.4D401E"));
        assert_eq!(low.acodec.as_deref(), Some("none"));
        assert_eq!(low.url, MANIFEST_URL);
        assert_eq!(low.manifest_url, MANIFEST_URL);

        assert_eq!(formats[1].format_id, "video=2500000");
        assert_eq!(formats[1].height, Some(720));
    }

    #[test]
    fn test_parse_mpd_template_with_fixed_duration() {
        let formats = parse_mpd_formats(MPD, MANIFEST_URL, "CQvs74EAaJj").unwrap();
        let fragments = &formats[0].fragments;

        // init + 10s / 2s
        assert_eq!(fragments.len(), 6);
        assert_eq!(
            fragments[0],
            Fragment {
                url: "https://cdn.example/vod/CQvs74EAaJj/video=400000/init.mp4".to_string(),
                duration: None,
            }
        );
        assert_eq!(
            fragments[1].url,
            "https://cdn.example/vod/CQvs74EAaJj/video=400000/1.m4s"
        );
        assert_eq!(fragments[1].duration, Some(2.0));
        assert_eq!(
            fragments[5].url,
            "https://cdn.example/vod/CQvs74EAaJj/video=400000/5.m4s"
        );
        assert_eq!(
            formats[1].fragments[1].url,
            "https://cdn.example/vod/CQvs74EAaJj/video=2500000/1.m4s"
        );
    }

    #[test]
    fn test_parse_mpd_audio_format() {
        let formats = parse_mpd_formats(MPD, MANIFEST_URL, "CQvs74EAaJj").unwrap();
        let audio = &formats[2];

        assert_eq!(audio.format_id, "audio=128000");
        assert_eq!(audio.ext, "m4a");
        assert_eq!(audio.vcodec.as_deref(), Some("none"));
        assert_eq!(audio.acodec.as_deref(), Some("mp4a.40.2"));
        assert_eq!(audio.asr, Some(48000));
        assert_eq!(audio.language.as_deref(), Some("nl"));
        assert_eq!(audio.url, "https://cdn.example/vod/CQvs74EAaJj/audio/track.mp4");
        assert_eq!(audio.protocol, "https");
        assert!(audio.fragments.is_empty());
    }

    #[test]
    fn test_parse_mpd_usp_timeline() {
        let manifest_url = "https://cdn.example/a/manifest.mpd";
        let formats = parse_mpd_formats(USP_MPD, manifest_url, "CQvs74EAaJj").unwrap();
        assert_eq!(formats.len(), 3);

        let audio = &formats[0];
        assert_eq!(audio.format_id, "audio=128000");
        assert_eq!(audio.asr, Some(48000));
        assert_eq!(audio.protocol, DASH_PROTOCOL);
        assert_eq!(audio.url, "https://cdn.example/a/dash/");
        let urls: Vec<&str> = audio.fragments.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://cdn.example/a/dash/CQvs74EAaJj-audio=128000.dash",
                "https://cdn.example/a/dash/CQvs74EAaJj-audio=128000-0.dash",
                "https://cdn.example/a/dash/CQvs74EAaJj-audio=128000-192000.dash",
            ]
        );
        assert_eq!(audio.fragments[1].duration, Some(4.0));

        // r="-1" repeats until the 8s period end
        let video = &formats[2];
        assert_eq!(video.format_id, "video=3000000");
        assert_eq!(video.asr, None);
        let urls: Vec<&str> = video.fragments.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://cdn.example/a/dash/CQvs74EAaJj-video=3000000.dash",
                "https://cdn.example/a/dash/CQvs74EAaJj-video=3000000-0.dash",
                "https://cdn.example/a/dash/CQvs74EAaJj-video=3000000-2400.dash",
            ]
        );
    }

    #[test]
    fn test_parse_mpd_representation_template_overrides_adaptation() {
        let xml = r#"<MPD mediaPresentationDuration="PT4S">
          <Period>
            <AdaptationSet mimeType="video/mp4">
              <SegmentTemplate timescale="1" duration="2" startNumber="10" media="$Number$.m4s"/>
              <Representation id="v1" bandwidth="500000">
                <SegmentTemplate media="v1-$Number%03d$.m4s"/>
              </Representation>
            </AdaptationSet>
          </Period>
        </MPD>"#;

        let formats = parse_mpd_formats(xml, MANIFEST_URL, "abc").unwrap();
        let urls: Vec<&str> = formats[0].fragments.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://cdn.example/vod/CQvs74EAaJj/v1-010.m4s",
                "https://cdn.example/vod/CQvs74EAaJj/v1-011.m4s",
            ]
        );
    }

    #[test]
    fn test_parse_mpd_segment_list() {
        let xml = r#"<MPD>
          <Period>
            <AdaptationSet mimeType="video/mp4">
              <Representation id="v1" bandwidth="500000">
                <BaseURL>https://media.example/v1/</BaseURL>
                <SegmentList timescale="1000" duration="2000">
                  <Initialization sourceURL="init.mp4"/>
                  <SegmentURL media="seg-1.m4s"/>
                  <SegmentURL media="seg-2.m4s"/>
                </SegmentList>
              </Representation>
            </AdaptationSet>
          </Period>
        </MPD>"#;

        let formats = parse_mpd_formats(xml, MANIFEST_URL, "abc").unwrap();
        let format = &formats[0];
        assert_eq!(format.protocol, DASH_PROTOCOL);
        assert_eq!(
            format.fragments,
            vec![
                Fragment {
                    url: "https://media.example/v1/init.mp4".to_string(),
                    duration: None,
                },
                Fragment {
                    url: "https://media.example/v1/seg-1.m4s".to_string(),
                    duration: Some(2.0),
                },
                Fragment {
                    url: "https://media.example/v1/seg-2.m4s".to_string(),
                    duration: Some(2.0),
                },
            ]
        );
    }

    #[test]
    fn test_parse_mpd_too_many_segments() {
        let xml = r#"<MPD mediaPresentationDuration="PT1000H">
          <Period>
            <AdaptationSet mimeType="video/mp4">
              <SegmentTemplate timescale="1000" duration="1" media="$Number$.m4s"/>
              <Representation id="v1" bandwidth="500000"/>
            </AdaptationSet>
          </Period>
        </MPD>"#;

        match parse_mpd_formats(xml, MANIFEST_URL, "abc") {
            Err(KijkError::ParseError(msg)) => assert!(msg.contains("segments")),
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_mpd_template_without_period_length() {
        let xml = r#"<MPD>
          <Period>
            <AdaptationSet mimeType="video/mp4">
              <SegmentTemplate timescale="1000" duration="2000" media="$Number$.m4s"/>
              <Representation id="v1" bandwidth="500000"/>
            </AdaptationSet>
          </Period>
        </MPD>"#;

        let formats = parse_mpd_formats(xml, MANIFEST_URL, "abc").unwrap();
        assert!(formats[0].fragments.is_empty());
        assert_eq!(formats[0].protocol, "https");
    }

    #[test]
    fn test_parse_mpd_base_url_chain() {
        let xml = r#"<MPD>
          <BaseURL>https://media.example/root/</BaseURL>
          <Period>
            <BaseURL>p1/</BaseURL>
            <AdaptationSet contentType="video">
              <Representation bandwidth="1000000">
                <BaseURL>video.mp4</BaseURL>
              </Representation>
            </AdaptationSet>
          </Period>
        </MPD>"#;

        let formats = parse_mpd_formats(xml, MANIFEST_URL, "abc").unwrap();
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].url, "https://media.example/root/p1/video.mp4");
        assert_eq!(formats[0].format_id, "dash-0");
        assert_eq!(formats[0].ext, "mp4");
    }

    #[test]
    fn test_parse_mpd_without_periods() {
        let formats = parse_mpd_formats("<MPD></MPD>", MANIFEST_URL, "abc").unwrap();
        assert!(formats.is_empty());
    }

    #[test]
    fn test_parse_mpd_malformed() {
        let result = parse_mpd_formats("<MPD><Period></MPD>", MANIFEST_URL, "abc");
        assert!(matches!(result, Err(KijkError::ParseError(_))));
    }

    #[test]
    fn test_template_expand() {
        let pattern = Regex::new(TEMPLATE_PATTERN).unwrap();
        let context = context(&pattern);

        assert_eq!(
            context.expand("$RepresentationID$/$Number$.m4s", Some(3), None),
            "video=400000/3.m4s"
        );
        assert_eq!(context.expand("seg-$Number%05d$.m4s", Some(42), None), "seg-00042.m4s");
        assert_eq!(context.expand("$Bandwidth$-$Time$.m4s", None, Some(9600)), "400000-9600.m4s");
        assert_eq!(context.expand("a$$b", None, None), "a$b");
        assert_eq!(context.expand("$Time$.m4s", None, None), "$Time$.m4s");
        assert_eq!(context.expand("$Unknown$.m4s", Some(1), None), "$Unknown$.m4s");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("PT1H30M"), Some(5400.0));
        assert_eq!(parse_duration("PT634.566S"), Some(634.566));
        assert_eq!(parse_duration("P1DT1S"), Some(86_401.0));
        assert_eq!(parse_duration("1 hour"), None);
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("50/2"), Some(25.0));
        assert_eq!(parse_frame_rate("25/0"), None);
        assert_eq!(parse_frame_rate("fast"), None);
    }

    #[test]
    fn test_container_ext() {
        assert_eq!(container_ext("video", Some("video/mp4")), "mp4");
        assert_eq!(container_ext("audio", Some("audio/mp4")), "m4a");
        assert_eq!(container_ext("video", Some("video/webm")), "webm");
        assert_eq!(container_ext("video", None), "mp4");
    }
}
