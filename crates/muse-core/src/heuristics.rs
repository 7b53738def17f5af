//! Text heuristics used by the selectors and the recalibrator.
//!
//! These are marker-phrase matchers, not models. They sit behind the
//! `TextClassifier` and `ResponseScorer` traits so a better implementation
//! can be dropped in without touching the selection algorithms.

use crate::config::QualityHeuristics;

/// `text -> bool` strategy.
pub trait TextClassifier: Send + Sync {
    fn classify(&self, text: &str) -> bool;
}

/// `text -> score` strategy. Scores are within [0, 1].
pub trait ResponseScorer: Send + Sync {
    fn score(&self, text: &str) -> f64;
}

/// Case-insensitive bidirectional substring match.
///
/// `"branding"` matches `"branding strategy"` and `"brand"` matches
/// `"branding"`. Empty strings never match.
pub fn loosely_matches(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Lowercased alphanumeric tokens of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Counts marker occurrences in `text`.
///
/// Plain ASCII words are matched against whole tokens so that `"i"` does not
/// fire inside `"this"`. Phrases, punctuated markers and non-ASCII markers are
/// matched as substrings since particles attach directly to Korean words.
pub fn count_markers(text: &str, markers: &[String]) -> usize {
    let lowered = text.to_lowercase();
    let tokens = tokenize(text);
    markers
        .iter()
        .map(|marker| {
            let marker = marker.to_lowercase();
            if marker
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '\'')
            {
                tokens.iter().filter(|t| **t == marker).count()
            } else {
                lowered.matches(marker.as_str()).count()
            }
        })
        .sum()
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Fires when the text contains any of its marker phrases.
#[derive(Debug, Clone)]
pub struct MarkerClassifier {
    markers: Vec<String>,
}

impl MarkerClassifier {
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    /// Detects that the answer illustrates its point with an example.
    pub fn example_markers() -> Self {
        Self::new(owned(&[
            "for example",
            "for instance",
            "e.g.",
            "such as",
            "case study",
            "예를 들어",
            "예를 들면",
            "사례",
        ]))
    }

    /// Detects that the answer draws on the speaker's own experience.
    pub fn personal_experience_markers() -> Self {
        Self::new(owned(&[
            "i",
            "i've",
            "i'm",
            "my",
            "me",
            "in my experience",
            "제가",
            "저는",
            "제 경험",
        ]))
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl TextClassifier for MarkerClassifier {
    fn classify(&self, text: &str) -> bool {
        count_markers(text, &self.markers) > 0
    }
}

fn professional_terms() -> Vec<String> {
    owned(&[
        "strategy",
        "brand",
        "branding",
        "positioning",
        "customer",
        "audience",
        "market",
        "target",
        "conversion",
        "retention",
        "engagement",
        "funnel",
        "kpi",
        "roi",
        "전략",
        "브랜딩",
        "고객",
        "타겟",
    ])
}

/// Scores how much profile-enriching substance an admin answer carries.
///
/// Sum of a length band score, an example bonus, and capped bonuses for
/// professional vocabulary and first-person statements.
pub struct ResponseQualityScorer {
    config: QualityHeuristics,
    example: Box<dyn TextClassifier>,
    professional_terms: Vec<String>,
    first_person: Vec<String>,
}

impl ResponseQualityScorer {
    pub fn new(config: QualityHeuristics) -> Self {
        Self {
            config,
            example: Box::new(MarkerClassifier::example_markers()),
            professional_terms: professional_terms(),
            first_person: MarkerClassifier::personal_experience_markers().markers().to_vec(),
        }
    }

    pub fn with_example_classifier(mut self, classifier: Box<dyn TextClassifier>) -> Self {
        self.example = classifier;
        self
    }

    fn length_score(&self, chars: usize) -> f64 {
        let c = &self.config;
        if chars == 0 {
            0.0
        } else if chars < c.ideal_min_chars {
            c.short_score
        } else if chars <= c.ideal_max_chars {
            c.length_score
        } else {
            // Diminishing above the band, never below the short-answer score.
            let ratio = c.ideal_max_chars as f64 / chars as f64;
            (c.length_score * ratio).max(c.short_score)
        }
    }
}

impl ResponseScorer for ResponseQualityScorer {
    fn score(&self, text: &str) -> f64 {
        let text = text.trim();
        if text.is_empty() {
            return 0.0;
        }
        let c = &self.config;

        let mut score = self.length_score(text.chars().count());
        if self.example.classify(text) {
            score += c.example_bonus;
        }
        let terms = count_markers(text, &self.professional_terms) as f64;
        score += (terms * c.professional_term_bonus).min(c.professional_term_cap);
        let first_person = count_markers(text, &self.first_person) as f64;
        score += (first_person * c.first_person_bonus).min(c.first_person_cap);

        score.clamp(0.0, 1.0)
    }
}
