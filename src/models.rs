use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// A single post entry as shown on the glasses.
///
/// Index 0 of every fetched list is a synthetic help entry carrying usage
/// instructions; it has no permalink and zero comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub ups: i64,
    pub permalink: String,
    pub subreddit: String,
    pub author: String,
    pub created_utc_seconds: u64,
    pub num_comments: i64,
}

/// One flattened comment. `depth` is the reply-nesting level, used only for
/// indentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub body: String,
    pub author: String,
    pub created_utc_seconds: u64,
    pub ups: i64,
    pub depth: u32,
}

/// A named feed configuration selecting which subreddits to browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedOption {
    pub label: &'static str,
    pub description: &'static str,
    /// Upstream path segment, e.g. `r/programming+webdev`. Empty means the
    /// front page.
    pub path: &'static str,
}

/// The fixed feed table. Exactly one entry is current at any time.
pub const FEED_OPTIONS: &[FeedOption] = &[
    FeedOption {
        label: "Front Page",
        description: "Reddit's default top posts of the day",
        path: "",
    },
    FeedOption {
        label: "Tech & AI",
        description: "localllama + sysadmin + chatgpt",
        path: "r/localllama+sysadmin+chatgpt",
    },
    FeedOption {
        label: "AR & Smart Glasses",
        description: "augmentedreality + SmartGlasses + wearables",
        path: "r/augmentedreality+SmartGlasses+wearables",
    },
    FeedOption {
        label: "Programming",
        description: "programming + webdev + rust + devops + nix",
        path: "r/programming+webdev+rust+devops+nix",
    },
    FeedOption {
        label: "Science & Space",
        description: "science + space + physics + askscience",
        path: "r/science+space+physics+askscience",
    },
    FeedOption {
        label: "World News",
        description: "worldnews + geopolitics + economics + news",
        path: "r/worldnews+geopolitics+economics+news",
    },
    FeedOption {
        label: "Finance",
        description: "wallstreetbets + investing + stocks + personalfinance",
        path: "r/wallstreetbets+investing+stocks+personalfinance",
    },
    FeedOption {
        label: "Gaming",
        description: "pcgaming + games + linux_gaming + indiegaming",
        path: "r/pcgaming+games+linux_gaming+indiegaming",
    },
    FeedOption {
        label: "Self-hosted & Homelab",
        description: "selfhosted + homelab + homeassistant + pihole",
        path: "r/selfhosted+homelab+homeassistant+pihole",
    },
];

// ---------------------------------------------------------------------------
// Wire schema (upstream listing JSON)
// ---------------------------------------------------------------------------

/// A listing wrapper: `{ "data": { "children": [...] } }`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Listing {
    #[serde(default)]
    pub data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
}

/// A typed listing node. Posts are kind `t3`, comments `t1`; anything else
/// (e.g. `more` stubs) is skipped by the parsers.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Thing {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPost {
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub ups: i64,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub subreddit_name_prefixed: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub num_comments: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawComment {
    pub body: Option<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub ups: i64,
    #[serde(default)]
    pub depth: u32,
    /// A nested listing on branches; the upstream emits `""` on leaves.
    #[serde(default)]
    pub replies: serde_json::Value,
}
