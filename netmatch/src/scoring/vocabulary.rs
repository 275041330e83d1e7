//! Term normalization tables injected into the scorers.
//!
//! Synonyms, related-industry groups, title keywords and match-type triggers
//! are plain data built once and shared read-only. Callers extend the
//! built-ins through [`VocabularyConfig`].

use crate::attributes::Seniority;
use crate::models::MatchType;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum length for substring matching between terms
const MIN_PARTIAL_LEN: usize = 3;

/// Similarity between two industries in the same related group
pub const RELATED_INDUSTRY_SIMILARITY: f64 = 0.6;

/// User-supplied additions to the built-in tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// canonical term -> aliases
    #[serde(default)]
    pub skill_synonyms: BTreeMap<String, Vec<String>>,

    /// canonical industry -> aliases
    #[serde(default)]
    pub industry_synonyms: BTreeMap<String, Vec<String>>,

    /// canonical channel -> aliases
    #[serde(default)]
    pub channel_synonyms: BTreeMap<String, Vec<String>>,

    /// Groups of canonical industries considered adjacent
    #[serde(default)]
    pub related_industries: Vec<Vec<String>>,
}

/// Keywords that make a match type worth evaluating for a pair
#[derive(Debug, Clone, Default)]
pub struct TypeTriggers {
    pub need_keywords: Vec<String>,
    pub offer_keywords: Vec<String>,
}

/// Immutable lookup tables for scoring.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    terms: FxHashMap<String, String>,
    industries: FxHashMap<String, String>,
    channels: FxHashMap<String, String>,
    industry_groups: FxHashMap<String, Vec<usize>>,
    /// Ordered most senior first; first hit wins
    title_keywords: Vec<(String, Seniority)>,
    triggers: FxHashMap<MatchType, TypeTriggers>,
}

const SKILL_SYNONYMS: &[(&str, &[&str])] = &[
    ("javascript", &["js", "ecmascript"]),
    ("typescript", &["ts"]),
    ("python", &["py"]),
    ("machine learning", &["ml", "deep learning"]),
    ("artificial intelligence", &["ai"]),
    ("user experience", &["ux", "ux design"]),
    ("product management", &["pm", "product manager"]),
    ("fundraising", &["raising capital", "capital raising"]),
    ("funding", &["capital", "investment", "seed funding", "venture capital", "vc"]),
    ("mentorship", &["mentoring", "coaching", "advice", "guidance"]),
    ("hiring", &["recruiting", "recruitment", "talent acquisition"]),
    ("go to market", &["gtm", "go-to-market"]),
    ("kubernetes", &["k8s"]),
];

const INDUSTRY_SYNONYMS: &[(&str, &[&str])] = &[
    ("software", &["saas", "tech", "technology", "information technology", "it"]),
    ("fintech", &["financial technology", "payments"]),
    ("finance", &["banking", "financial services"]),
    ("venture capital", &["vc", "private equity", "investment"]),
    ("healthcare", &["health", "medical", "health care"]),
    ("biotech", &["biotechnology", "life sciences", "pharma"]),
    ("education", &["edtech", "e-learning"]),
    ("retail", &["ecommerce", "e-commerce"]),
    ("media", &["entertainment", "publishing"]),
];

const CHANNEL_SYNONYMS: &[(&str, &[&str])] = &[
    ("email", &["e-mail", "mail"]),
    ("phone", &["call", "telephone", "voice"]),
    ("video", &["zoom", "video call", "meet"]),
    ("messaging", &["chat", "slack", "sms", "text"]),
    ("linkedin", &["li", "inmail"]),
    ("in person", &["in-person", "coffee", "meetup"]),
];

const RELATED_INDUSTRIES: &[&[&str]] = &[
    &["software", "fintech", "education"],
    &["fintech", "finance", "venture capital"],
    &["healthcare", "biotech"],
    &["retail", "media"],
];

const TITLE_KEYWORDS: &[(&str, Seniority)] = &[
    ("chief", Seniority::Executive),
    ("ceo", Seniority::Executive),
    ("cto", Seniority::Executive),
    ("cfo", Seniority::Executive),
    ("coo", Seniority::Executive),
    ("founder", Seniority::Executive),
    ("co-founder", Seniority::Executive),
    ("president", Seniority::Executive),
    ("partner", Seniority::Executive),
    ("vice president", Seniority::Director),
    ("vp", Seniority::Director),
    ("head of", Seniority::Director),
    ("director", Seniority::Director),
    ("principal", Seniority::Lead),
    ("staff", Seniority::Lead),
    ("lead", Seniority::Lead),
    ("manager", Seniority::Lead),
    ("senior", Seniority::Senior),
    ("sr", Seniority::Senior),
    ("associate", Seniority::Junior),
    ("junior", Seniority::Junior),
    ("jr", Seniority::Junior),
    ("intern", Seniority::Intern),
];

const TRIGGERS: &[(MatchType, &[&str], &[&str])] = &[
    (
        MatchType::Investment,
        &["funding", "fundraising", "investor", "seed", "series a"],
        &["funding", "angel", "investing", "term sheet"],
    ),
    (
        MatchType::Hiring,
        &["hiring", "hire", "engineer", "developer", "designer", "talent"],
        &["job", "role", "opportunity", "hiring"],
    ),
    (
        MatchType::KnowledgeExchange,
        &["mentorship", "learning", "expertise", "feedback"],
        &["mentorship", "expertise", "training", "teaching"],
    ),
    (
        MatchType::Collaboration,
        &["partner", "partnership", "collaboration", "cofounder", "co-founder"],
        &["partnership", "collaboration", "joint venture", "integration"],
    ),
    (
        MatchType::Event,
        &["speaker", "event", "conference", "networking"],
        &["speaking", "event", "conference", "venue", "sponsorship"],
    ),
    (
        MatchType::Introduction,
        &["introduction", "intro", "connections", "network"],
        &["introduction", "introductions", "network", "connections"],
    ),
];

/// Lowercase, trim, collapse whitespace, drop punctuation except `+ # - .`
pub fn normalize(term: &str) -> String {
    let cleaned: String = term
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '+' | '#' | '-' | '.') {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-word phrase containment on normalized text
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    format!(" {} ", haystack).contains(&format!(" {} ", phrase))
}

fn insert_aliases<S: AsRef<str>>(
    table: &mut FxHashMap<String, String>,
    canonical: &str,
    aliases: impl IntoIterator<Item = S>,
) {
    let canonical = normalize(canonical);
    table.insert(canonical.clone(), canonical.clone());
    for alias in aliases {
        table.insert(normalize(alias.as_ref()), canonical.clone());
    }
}

fn alias_table(
    builtin: &[(&str, &[&str])],
    extra: &BTreeMap<String, Vec<String>>,
) -> FxHashMap<String, String> {
    let mut table = FxHashMap::default();
    for (canonical, aliases) in builtin {
        insert_aliases(&mut table, canonical, aliases.iter());
    }
    for (canonical, aliases) in extra {
        insert_aliases(&mut table, canonical, aliases.iter());
    }
    table
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(&VocabularyConfig::default())
    }
}

impl Vocabulary {
    /// Built-in tables extended with `config`
    pub fn new(config: &VocabularyConfig) -> Self {
        let terms = alias_table(SKILL_SYNONYMS, &config.skill_synonyms);
        let industries = alias_table(INDUSTRY_SYNONYMS, &config.industry_synonyms);
        let channels = alias_table(CHANNEL_SYNONYMS, &config.channel_synonyms);

        let mut industry_groups = FxHashMap::default();
        let builtin_groups = RELATED_INDUSTRIES
            .iter()
            .map(|g| g.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        let groups: Vec<Vec<String>> = builtin_groups
            .chain(config.related_industries.iter().cloned())
            .collect();
        for (group_id, group) in groups.iter().enumerate() {
            for industry in group {
                let canonical = industries
                    .get(&normalize(industry))
                    .cloned()
                    .unwrap_or_else(|| normalize(industry));
                industry_groups
                    .entry(canonical)
                    .or_insert_with(Vec::new)
                    .push(group_id);
            }
        }

        let title_keywords = TITLE_KEYWORDS
            .iter()
            .map(|(k, s)| (k.to_string(), *s))
            .collect();

        let triggers = TRIGGERS
            .iter()
            .map(|(t, needs, offers)| {
                (
                    *t,
                    TypeTriggers {
                        need_keywords: needs.iter().map(|s| s.to_string()).collect(),
                        offer_keywords: offers.iter().map(|s| s.to_string()).collect(),
                    },
                )
            })
            .collect();

        Self {
            terms,
            industries,
            channels,
            industry_groups,
            title_keywords,
            triggers,
        }
    }

    /// Canonical form of a skill, need, offering or interest.
    ///
    /// Whole-phrase aliases win; otherwise each word is mapped on its own,
    /// so "ML engineer" becomes "machine learning engineer".
    pub fn canonical_term(&self, term: &str) -> String {
        let normalized = normalize(term);
        if let Some(canonical) = self.terms.get(&normalized) {
            return canonical.clone();
        }
        normalized
            .split(' ')
            .map(|word| self.terms.get(word).map(String::as_str).unwrap_or(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn canonical_industry(&self, industry: &str) -> String {
        let normalized = normalize(industry);
        self.industries.get(&normalized).cloned().unwrap_or(normalized)
    }

    pub fn canonical_channel(&self, channel: &str) -> String {
        let normalized = normalize(channel);
        self.channels.get(&normalized).cloned().unwrap_or(normalized)
    }

    /// Two terms match when their canonical forms are equal, or when one
    /// contains the other as whole words (both at least 3 characters).
    pub fn terms_match(&self, a: &str, b: &str) -> bool {
        let a = self.canonical_term(a);
        let b = self.canonical_term(b);
        if a.is_empty() || b.is_empty() {
            return false;
        }
        if a == b {
            return true;
        }
        a.len() >= MIN_PARTIAL_LEN
            && b.len() >= MIN_PARTIAL_LEN
            && (contains_phrase(&a, &b) || contains_phrase(&b, &a))
    }

    /// 1.0 same industry, 0.6 related, 0.0 otherwise or unknown
    pub fn industry_similarity(&self, a: &str, b: &str) -> f64 {
        let a = self.canonical_industry(a);
        let b = self.canonical_industry(b);
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }
        match (self.industry_groups.get(&a), self.industry_groups.get(&b)) {
            (Some(ga), Some(gb)) if ga.iter().any(|g| gb.contains(g)) => {
                RELATED_INDUSTRY_SIMILARITY
            }
            _ => 0.0,
        }
    }

    /// Seniority implied by a job title, most senior keyword first
    pub fn infer_seniority(&self, title: &str) -> Option<Seniority> {
        let title = normalize(title);
        self.title_keywords
            .iter()
            .find(|(keyword, _)| contains_phrase(&title, keyword))
            .map(|(_, s)| *s)
    }

    pub fn triggers(&self, match_type: MatchType) -> Option<&TypeTriggers> {
        self.triggers.get(&match_type)
    }

    /// Any item mentions any keyword, after canonicalization
    pub fn mentions_any(&self, items: &[String], keywords: &[String]) -> bool {
        items.iter().any(|item| {
            let raw = normalize(item);
            let canonical = self.canonical_term(item);
            keywords.iter().any(|k| {
                let k = normalize(k);
                contains_phrase(&raw, &k)
                    || contains_phrase(&canonical, &k)
                    || canonical == self.canonical_term(&k)
            })
        })
    }
}
