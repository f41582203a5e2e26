use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of spending categories. `Other` is the fallback and is
/// never scored by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Bills,
    Entertainment,
    Health,
    Education,
    Other,
}

impl Category {
    /// Every member of the closed set.
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Bills,
        Category::Entertainment,
        Category::Health,
        Category::Education,
        Category::Other,
    ];

    /// The scored categories, in declaration order. Classifier ties are
    /// broken by position in this array (earlier wins).
    pub const SCORED: [Category; 7] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Bills,
        Category::Entertainment,
        Category::Health,
        Category::Education,
    ];

    /// Human-readable label for reports and exports.
    pub fn label(self) -> &'static str {
        match self {
            Category::Food => "Food & Dining",
            Category::Transport => "Transportation",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills & Utilities",
            Category::Entertainment => "Entertainment",
            Category::Health => "Healthcare",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Shopping => "shopping",
            Category::Bills => "bills",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Education => "education",
            Category::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "food" => Ok(Category::Food),
            "transport" => Ok(Category::Transport),
            "shopping" => Ok(Category::Shopping),
            "bills" => Ok(Category::Bills),
            "entertainment" => Ok(Category::Entertainment),
            "health" => Ok(Category::Health),
            "education" => Ok(Category::Education),
            "other" => Ok(Category::Other),
            other => Err(format!("Unknown category: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn display_fromstr_roundtrip() {
        for cat in Category::ALL {
            assert_eq!(Category::from_str(&cat.to_string()).unwrap(), cat);
        }
    }

    #[test]
    fn unknown_token_is_rejected() {
        assert!(Category::from_str("groceries").is_err());
        assert!(Category::from_str("").is_err());
    }

    #[test]
    fn scored_excludes_other() {
        assert!(!Category::SCORED.contains(&Category::Other));
        assert_eq!(Category::SCORED.len(), Category::ALL.len() - 1);
    }

    #[test]
    fn first_scored_category_is_food() {
        // Tie-break authority: earliest declared wins.
        assert_eq!(Category::SCORED[0], Category::Food);
    }
}
