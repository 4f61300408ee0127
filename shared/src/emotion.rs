use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

/// The closed set of labels the classifiers produce. Upstream services mix
/// English labels with Spanish aliases, all of which parse here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Emotion {
    #[strum(to_string = "anger", serialize = "angry", serialize = "enojo", serialize = "ira")]
    Anger,
    #[strum(to_string = "disgust", serialize = "asco", serialize = "disgusto")]
    Disgust,
    #[strum(to_string = "fear", serialize = "fearful", serialize = "miedo")]
    Fear,
    #[strum(
        to_string = "joy",
        serialize = "happy",
        serialize = "happiness",
        serialize = "alegría",
        serialize = "alegria"
    )]
    Joy,
    #[strum(to_string = "neutral")]
    Neutral,
    #[strum(to_string = "sadness", serialize = "sad", serialize = "tristeza")]
    Sadness,
    #[strum(to_string = "surprise", serialize = "surprised", serialize = "sorpresa")]
    Surprise,
}

impl Emotion {
    pub fn from_label(label: &str) -> Option<Self> {
        label.trim().to_lowercase().parse().ok()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Emotion::Anger => "Enojo",
            Emotion::Disgust => "Disgusto",
            Emotion::Fear => "Miedo",
            Emotion::Joy => "Alegría",
            Emotion::Neutral => "Neutral",
            Emotion::Sadness => "Tristeza",
            Emotion::Surprise => "Sorpresa",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Emotion::Anger => "😠",
            Emotion::Disgust => "🤢",
            Emotion::Fear => "😨",
            Emotion::Joy => "😄",
            Emotion::Neutral => "😐",
            Emotion::Sadness => "😢",
            Emotion::Surprise => "😮",
        }
    }
}

/// Display name for any label, falling back to the raw label when it is not
/// one of the known emotions.
pub fn display_label(label: &str) -> String {
    Emotion::from_label(label)
        .map(|e| e.display_name().to_string())
        .unwrap_or_else(|| label.to_string())
}

pub fn label_icon(label: &str) -> &'static str {
    Emotion::from_label(label).map_or("❓", |e| e.icon())
}

/// Score convention of a classification endpoint. Nothing in a payload says
/// which one applies, so it is configured per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScoreScale {
    #[default]
    Fraction,
    Percentage,
}

impl ScoreScale {
    /// Bar width in percent, rounded to one decimal and clamped to 0..=100.
    pub fn to_percent(&self, score: f64) -> f64 {
        let raw = match self {
            ScoreScale::Fraction => score * 100.0,
            ScoreScale::Percentage => score,
        };
        ((raw * 10.0).round() / 10.0).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidScore {
    pub label: String,
    pub score: f64,
}

impl fmt::Display for InvalidScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid score {} for '{}'", self.score, self.label)
    }
}

/// Label to score mapping in the order the upstream service produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmotionDistribution {
    scores: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmotionBar {
    pub label: String,
    pub emotion: Option<Emotion>,
    pub score: f64,
    pub width_percent: f64,
}

impl EmotionBar {
    pub fn style(&self) -> String {
        format!("width: {}%", self.width_percent)
    }

    pub fn percent_text(&self) -> String {
        format!("{:.1}%", self.width_percent)
    }
}

impl EmotionDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the score in place when the label already exists.
    pub fn insert(&mut self, label: impl Into<String>, score: f64) {
        let label = label.into();
        match self.scores.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = score,
            None => self.scores.push((label, score)),
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, s)| *s)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(l, s)| (l.as_str(), *s))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn validate(&self) -> Result<(), InvalidScore> {
        match self
            .scores
            .iter()
            .find(|(_, s)| !s.is_finite() || *s < 0.0)
        {
            Some((label, score)) => Err(InvalidScore {
                label: label.clone(),
                score: *score,
            }),
            None => Ok(()),
        }
    }

    /// Label with the highest score. Among equal maxima the first one in
    /// upstream order wins.
    pub fn dominant(&self) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (label, score) in self.iter() {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((label, score)),
            }
        }
        best.map(|(label, _)| label)
    }

    /// Entries sorted by descending score; ties keep upstream order.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        entries
    }

    pub fn bars(&self, scale: ScoreScale) -> Vec<EmotionBar> {
        self.ranked()
            .into_iter()
            .map(|(label, score)| EmotionBar {
                label: label.to_string(),
                emotion: Emotion::from_label(label),
                score,
                width_percent: scale.to_percent(score),
            })
            .collect()
    }
}

impl<L: Into<String>> FromIterator<(L, f64)> for EmotionDistribution {
    fn from_iter<T: IntoIterator<Item = (L, f64)>>(iter: T) -> Self {
        let mut dist = EmotionDistribution::new();
        for (label, score) in iter {
            dist.insert(label, score);
        }
        dist
    }
}

impl Serialize for EmotionDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.scores.len()))?;
        for (label, score) in &self.scores {
            map.serialize_entry(label, score)?;
        }
        map.end()
    }
}

struct DistributionVisitor;

impl<'de> Visitor<'de> for DistributionVisitor {
    type Value = EmotionDistribution;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of emotion labels to numeric scores")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut dist = EmotionDistribution::new();
        while let Some((label, score)) = access.next_entry::<String, f64>()? {
            dist.insert(label, score);
        }
        Ok(dist)
    }
}

impl<'de> Deserialize<'de> for EmotionDistribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DistributionVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_locale_aliases() {
        assert_eq!(Emotion::from_label("Alegría"), Some(Emotion::Joy));
        assert_eq!(Emotion::from_label("happy"), Some(Emotion::Joy));
        assert_eq!(Emotion::from_label(" TRISTEZA "), Some(Emotion::Sadness));
        assert_eq!(Emotion::from_label("asco"), Some(Emotion::Disgust));
        assert_eq!(Emotion::from_label("boredom"), None);
        assert_eq!(Emotion::Surprise.to_string(), "surprise");
    }

    #[test]
    fn unknown_labels_display_verbatim() {
        assert_eq!(display_label("joy"), "Alegría");
        assert_eq!(display_label("boredom"), "boredom");
        assert_eq!(label_icon("boredom"), "❓");
    }

    #[test]
    fn keeps_upstream_key_order() {
        let dist: EmotionDistribution =
            serde_json::from_str(r#"{"sadness": 0.1, "joy": 0.8, "anger": 0.1}"#).unwrap();
        let labels: Vec<&str> = dist.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["sadness", "joy", "anger"]);
        assert_eq!(
            serde_json::to_string(&dist).unwrap(),
            r#"{"sadness":0.1,"joy":0.8,"anger":0.1}"#
        );
    }

    #[test]
    fn dominant_prefers_first_of_equal_maxima() {
        let dist: EmotionDistribution = [("fear", 0.4), ("joy", 0.4), ("neutral", 0.2)]
            .into_iter()
            .collect();
        assert_eq!(dist.dominant(), Some("fear"));
        assert_eq!(EmotionDistribution::new().dominant(), None);
    }

    #[test]
    fn rejects_negative_and_nan_scores() {
        let dist: EmotionDistribution = [("joy", 0.5), ("fear", -0.1)].into_iter().collect();
        assert_eq!(dist.validate().unwrap_err().label, "fear");

        let dist: EmotionDistribution = [("joy", f64::NAN)].into_iter().collect();
        assert!(dist.validate().is_err());
    }

    #[test]
    fn fraction_bars_render_as_percentages() {
        let dist: EmotionDistribution = [("sadness", 0.1), ("joy", 0.8)].into_iter().collect();
        let bars = dist.bars(ScoreScale::Fraction);
        assert_eq!(bars[0].label, "joy");
        assert_eq!(bars[0].width_percent, 80.0);
        assert_eq!(bars[0].style(), "width: 80%");
        assert_eq!(bars[0].percent_text(), "80.0%");
        assert_eq!(bars[1].width_percent, 10.0);
    }

    #[test]
    fn percentage_bars_are_clamped() {
        let dist: EmotionDistribution = [("joy", 104.0), ("fear", 12.34)].into_iter().collect();
        let bars = dist.bars(ScoreScale::Percentage);
        assert_eq!(bars[0].width_percent, 100.0);
        assert_eq!(bars[1].width_percent, 12.3);
    }
}
