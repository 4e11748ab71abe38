use crate::config::SentimentConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentiment label assigned to a review when it is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(format!("unknown sentiment: {}", other)),
        }
    }
}

/// Keyword-based sentiment classifier.
///
/// Keywords are matched as lower-cased substrings. Positive keywords are
/// checked first, so text matching both lists is classified as positive.
#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl SentimentClassifier {
    pub fn new<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            positive: Self::normalize(positive),
            negative: Self::normalize(negative),
        }
    }

    pub fn from_config(config: &SentimentConfig) -> Self {
        Self::new(&config.positive, &config.negative)
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        let text = text.to_lowercase();

        if self.positive.iter().any(|word| text.contains(word.as_str())) {
            Sentiment::Positive
        } else if self.negative.iter().any(|word| text.contains(word.as_str())) {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    // An empty keyword would match every text.
    fn normalize<I>(words: I) -> Vec<String>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect()
    }
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::from_config(&SentimentConfig::default())
    }
}
