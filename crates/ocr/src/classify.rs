use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smartspend_core::Category;

/// Guesses below this confidence are treated as no-match: a single
/// incidental keyword hit in a long receipt should not drive classification.
pub const CONFIDENCE_FLOOR: f32 = 0.3;

/// The classifier's verdict. `Other` with confidence 0 is the fallback —
/// never absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGuess {
    pub category: Category,
    /// Heuristic keyword-evidence score in [0, 1], not a calibrated
    /// probability.
    pub confidence: f32,
    pub matched_keywords: Vec<String>,
}

impl CategoryGuess {
    fn fallback() -> Self {
        CategoryGuess {
            category: Category::Other,
            confidence: 0.0,
            matched_keywords: Vec::new(),
        }
    }
}

/// Immutable category → keyword table, built once at startup and shared by
/// reference into every classifier. Keywords are lowercase substrings;
/// declaration order of the scored categories breaks ties.
#[derive(Debug, Clone)]
pub struct KeywordCatalogue {
    entries: Vec<(Category, Vec<String>)>,
}

#[derive(Debug, Deserialize)]
struct CatalogueFile {
    #[serde(rename = "category")]
    categories: Vec<CatalogueEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogueEntry {
    name: Category,
    keywords: Vec<String>,
}

impl KeywordCatalogue {
    pub fn new(entries: Vec<(Category, Vec<String>)>) -> Self {
        let entries = entries
            .into_iter()
            .filter(|(cat, _)| *cat != Category::Other)
            .map(|(cat, kws)| (cat, kws.into_iter().map(|k| k.to_lowercase()).collect()))
            .collect();
        KeywordCatalogue { entries }
    }

    /// Load a user-supplied catalogue from TOML:
    ///
    /// ```toml
    /// [[category]]
    /// name = "food"
    /// keywords = ["pizza", "cafe"]
    /// ```
    pub fn from_toml(toml_content: &str) -> Result<Self, String> {
        let file: CatalogueFile =
            toml::from_str(toml_content).map_err(|e| format!("Failed to parse TOML: {e}"))?;
        Ok(Self::new(
            file.categories
                .into_iter()
                .map(|e| (e.name, e.keywords))
                .collect(),
        ))
    }

    pub fn keywords_for(&self, category: Category) -> &[String] {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, kws)| kws.as_slice())
            .unwrap_or(&[])
    }

    fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.entries.iter().map(|(c, kws)| (*c, kws.as_slice()))
    }
}

impl Default for KeywordCatalogue {
    fn default() -> Self {
        let kw = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        KeywordCatalogue::new(vec![
            (Category::Food, kw(&[
                "zomato", "swiggy", "restaurant", "cafe", "pizza", "burger", "coffee",
                "tea", "food", "dining", "kitchen", "meal", "lunch", "dinner", "breakfast",
                "dominos", "kfc", "mcdonalds", "subway", "bakery", "ice cream",
            ])),
            (Category::Transport, kw(&[
                "uber", "ola", "taxi", "bus", "metro", "train", "fuel", "petrol",
                "diesel", "transport", "travel", "ride", "cab", "auto", "rickshaw",
                "parking", "toll", "rapido", "namma yatri",
            ])),
            (Category::Shopping, kw(&[
                "amazon", "flipkart", "mall", "store", "shop", "market", "retail",
                "clothing", "fashion", "shoes", "accessories", "electronics", "mobile",
                "laptop", "grocery", "supermarket", "big bazaar", "reliance", "myntra",
            ])),
            (Category::Bills, kw(&[
                "electricity", "water", "phone", "recharge", "internet", "wifi",
                "mobile", "postpaid", "prepaid", "utility", "gas", "cylinder",
                "broadband", "cable", "dtv", "airtel", "jio", "vi", "bsnl",
            ])),
            (Category::Entertainment, kw(&[
                "movie", "cinema", "theater", "game", "sports", "gym", "fitness",
                "netflix", "amazon prime", "hotstar", "spotify", "youtube", "subscription",
                "entertainment", "fun", "party", "event", "concert",
            ])),
            (Category::Health, kw(&[
                "hospital", "doctor", "medical", "pharmacy", "medicine", "clinic",
                "health", "checkup", "appointment", "treatment", "insurance",
                "apollo", "fortis", "medplus", "wellness",
            ])),
            (Category::Education, kw(&[
                "school", "college", "university", "course", "book", "study",
                "education", "tuition", "fee", "exam", "training", "workshop",
                "certification", "udemy", "coursera",
            ])),
        ])
    }
}

/// Keyword-coverage scorer over the shared catalogue. Pure and
/// deterministic; safe to re-run after user edits.
#[derive(Debug, Clone)]
pub struct Classifier {
    catalogue: Arc<KeywordCatalogue>,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(Arc::new(KeywordCatalogue::default()))
    }
}

impl Classifier {
    pub fn new(catalogue: Arc<KeywordCatalogue>) -> Self {
        Classifier { catalogue }
    }

    pub fn classify(&self, text: &str, merchant: &str) -> CategoryGuess {
        if text.is_empty() && merchant.is_empty() {
            return CategoryGuess::fallback();
        }

        let haystack = format!("{text} {merchant}").to_lowercase();

        // Coverage count: each keyword contributes at most once, however
        // often it repeats. Overwrite only on strictly greater score, so the
        // earliest-declared category wins ties.
        let mut best: Option<(Category, u32)> = None;
        for (category, keywords) in self.catalogue.iter() {
            let score = keywords.iter().filter(|k| haystack.contains(k.as_str())).count() as u32;
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((category, score));
            }
        }
        let (winner, score) = match best {
            Some(b) if b.1 > 0 => b,
            _ => return CategoryGuess::fallback(),
        };

        // Normalize "keywords per 10 words" into a 0–1 band, capped at 1.
        let word_count = haystack.split_whitespace().count() as f32;
        let confidence = (score as f32 / (word_count * 0.1).max(1.0)).min(1.0);

        if confidence < CONFIDENCE_FLOOR {
            return CategoryGuess::fallback();
        }

        let matched_keywords = self
            .catalogue
            .keywords_for(winner)
            .iter()
            .filter(|k| haystack.contains(k.as_str()))
            .cloned()
            .collect();

        CategoryGuess {
            category: winner,
            confidence,
            matched_keywords,
        }
    }
}
