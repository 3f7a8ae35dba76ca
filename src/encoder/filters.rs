use super::speed::decompose;
use crate::options::OptionSet;
use tracing::debug;

/// Output extensions ffmpeg writes as still/animated images without audio
const IMAGE_FORMATS: [&str; 9] = [
    "gif", "apng", "png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp",
];

/// One ffmpeg flag with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum FlagGroup {
    /// Flag that never takes a value, e.g. `-an`
    Switch(&'static str),
    /// Flag whose values are joined with commas, e.g. a filter chain
    Valued {
        name: &'static str,
        values: Vec<String>,
    },
}

impl FlagGroup {
    fn valued(name: &'static str) -> Self {
        Self::Valued {
            name,
            values: Vec::new(),
        }
    }

    fn single(name: &'static str, value: &str) -> Self {
        Self::Valued {
            name,
            values: vec![value.to_string()],
        }
    }

    fn push(&mut self, value: String) {
        if let Self::Valued { values, .. } = self {
            values.push(value);
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Self::Valued { values, .. } if values.is_empty())
    }

    /// Render as raw command line arguments
    pub fn to_args(&self) -> Vec<String> {
        match self {
            Self::Switch(name) => vec![name.to_string()],
            Self::Valued { name, values } => vec![name.to_string(), values.join(",")],
        }
    }
}

/// Flag groups for one job, in the order they go on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposedFilters {
    pub common: Vec<FlagGroup>,
    pub video: Vec<FlagGroup>,
    pub audio: Vec<FlagGroup>,
}

impl ComposedFilters {
    pub fn to_args(&self) -> Vec<String> {
        self.common
            .iter()
            .chain(&self.video)
            .chain(&self.audio)
            .flat_map(FlagGroup::to_args)
            .collect()
    }
}

/// Map the option set onto flag groups. `image_output` drops every audio flag.
pub fn compose(options: &OptionSet, image_output: bool) -> ComposedFilters {
    ComposedFilters {
        common: common_flags(options),
        video: video_flags(options),
        audio: if image_output {
            Vec::new()
        } else {
            audio_flags(options)
        },
    }
}

/// Whether the extension names an image format
pub fn is_image_format(extension: &str) -> bool {
    IMAGE_FORMATS.contains(&extension.to_lowercase().as_str())
}

fn common_flags(options: &OptionSet) -> Vec<FlagGroup> {
    let Some(trim) = options.trim.as_deref() else {
        return Vec::new();
    };

    let parts: Vec<&str> = trim.split(',').collect();
    let [start, end] = parts.as_slice() else {
        debug!("Ignoring malformed trim range {:?}", trim);
        return Vec::new();
    };

    let mut flags = Vec::new();
    if !start.is_empty() {
        flags.push(FlagGroup::single("-ss", start));
    }
    if !end.is_empty() {
        flags.push(FlagGroup::single("-to", end));
    }
    flags
}

fn video_flags(options: &OptionSet) -> Vec<FlagGroup> {
    let mut vf = FlagGroup::valued("-vf");
    if let Some(crop) = &options.crop {
        vf.push(format!("crop={}", crop));
    }
    if let Some(fps) = &options.fps {
        vf.push(format!("fps=fps={}", fps));
    }
    if let Some(rotate) = &options.rotate {
        vf.push(format!("transpose={}", rotate));
    }
    if options.reverse {
        vf.push("reverse".to_string());
    }
    if let Some(scale) = &options.scale {
        vf.push(format!("scale={}", scale));
    }
    if let Some(speed) = options.speed_change() {
        // setpts has no range limit, the whole decomposition collapses into one factor
        let factor: f64 = decompose(speed).iter().product();
        vf.push(format!("setpts={:.6}*PTS", 1.0 / factor));
    }

    if vf.is_empty() { Vec::new() } else { vec![vf] }
}

fn audio_flags(options: &OptionSet) -> Vec<FlagGroup> {
    if options.no_audio {
        return vec![FlagGroup::Switch("-an")];
    }

    let mut af = FlagGroup::valued("-af");
    if options.reverse {
        af.push("areverse".to_string());
    }
    if let Some(speed) = options.speed_change() {
        for tempo in decompose(speed) {
            af.push(format!("atempo={:.6}", tempo));
        }
    }
    if let Some(volume) = &options.volume {
        af.push(format!("volume={}", volume));
    }

    if af.is_empty() { Vec::new() } else { vec![af] }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trim(range: &str) -> Vec<String> {
        let opts = OptionSet {
            trim: Some(range.to_string()),
            ..Default::default()
        };
        compose(&opts, false).to_args()
    }

    #[test]
    fn trim_both_sides() {
        assert_eq!(trim("10,20"), vec!["-ss", "10", "-to", "20"]);
    }

    #[test]
    fn trim_single_side() {
        assert_eq!(trim("10,"), vec!["-ss", "10"]);
        assert_eq!(trim(",20"), vec!["-to", "20"]);
    }

    #[test]
    fn malformed_trim_is_ignored() {
        assert!(trim("bad").is_empty());
        assert!(trim("a,b,c").is_empty());
        assert!(trim(",").is_empty());
    }

    #[test]
    fn video_chain_order() {
        let opts = OptionSet {
            crop: Some("100:100".to_string()),
            fps: Some("24".to_string()),
            rotate: Some("1".to_string()),
            reverse: true,
            scale: Some("640:-1".to_string()),
            speed: Some(2.0),
            ..Default::default()
        };
        let composed = compose(&opts, false);
        assert_eq!(
            composed.video,
            vec![FlagGroup::Valued {
                name: "-vf",
                values: vec![
                    "crop=100:100".to_string(),
                    "fps=fps=24".to_string(),
                    "transpose=1".to_string(),
                    "reverse".to_string(),
                    "scale=640:-1".to_string(),
                    "setpts=0.500000*PTS".to_string(),
                ],
            }]
        );
    }

    #[test]
    fn empty_options_emit_nothing() {
        let composed = compose(&OptionSet::default(), false);
        assert_eq!(composed, ComposedFilters::default());
        assert!(composed.to_args().is_empty());
    }

    #[test]
    fn unit_speed_emits_nothing() {
        let opts = OptionSet {
            speed: Some(1.0),
            ..Default::default()
        };
        assert!(compose(&opts, false).to_args().is_empty());
    }

    #[test]
    fn audio_chain_decomposes_speed() {
        let opts = OptionSet {
            reverse: true,
            speed: Some(5.0),
            volume: Some("0.5".to_string()),
            ..Default::default()
        };
        assert_eq!(
            FlagGroup::to_args(&compose(&opts, false).audio[0]),
            vec![
                "-af",
                "areverse,atempo=2.000000,atempo=2.000000,atempo=1.250000,volume=0.5"
            ]
        );
    }

    #[test]
    fn no_audio_overrides_other_audio_options() {
        let opts = OptionSet {
            no_audio: true,
            reverse: true,
            speed: Some(3.0),
            volume: Some("2".to_string()),
            ..Default::default()
        };
        assert_eq!(compose(&opts, false).audio, vec![FlagGroup::Switch("-an")]);
    }

    #[test]
    fn image_output_drops_audio() {
        let opts = OptionSet {
            no_audio: true,
            volume: Some("2".to_string()),
            scale: Some("320:-1".to_string()),
            ..Default::default()
        };
        let composed = compose(&opts, true);
        assert!(composed.audio.is_empty());
        assert_eq!(composed.video.len(), 1);
    }

    #[test]
    fn image_formats() {
        assert!(is_image_format("gif"));
        assert!(is_image_format("PNG"));
        assert!(!is_image_format("mp4"));
    }
}
