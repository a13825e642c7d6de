use std::collections::VecDeque;

use crate::bridge::{
    normalize_gesture, DeviceStatus, Gesture, HubBridge, HubEvent, ListContainer, PageSpec,
    TextContainer, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use crate::cache::TtlCache;
use crate::client::ContentSource;
use crate::error::{GlassFeedError, Result};
use crate::models::{Comment, FeedOption, Post, FEED_OPTIONS};
use crate::util;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Controller tunables. `Default` mirrors the on-device values.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Display slots per screen page.
    pub items_per_page: usize,
    /// Minimum spacing between two accepted swipe gestures.
    pub swipe_cooldown_ms: u64,
    /// Freshness window for cached listings and comment threads.
    pub cache_ttl_ms: u64,
    /// Real posts requested per feed; the help entry comes on top.
    pub post_limit: usize,
    /// Maximum flattened comments per thread.
    pub comment_limit: usize,
    /// Event log entries kept before the oldest are dropped.
    pub event_log_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            items_per_page: 3,
            swipe_cooldown_ms: 300,
            cache_ttl_ms: crate::cache::DEFAULT_CACHE_TTL_MS,
            post_limit: 20,
            comment_limit: 50,
            event_log_capacity: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// The four mutually exclusive views. Exactly one is active per controller
/// instance, for the whole app session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Feeds,
    Posts,
    Comments,
    CommentDetail,
}

/// Container ID of the feed selector list.
const FEED_LIST_ID: u8 = 10;
/// Horizontal inset of list-item text blocks.
const ITEM_INSET: u16 = 12;
/// Widest comment indentation in device pixels.
const MAX_COMMENT_INDENT: u16 = 200;

/// First index of the page containing `selected`; always a multiple of
/// `page_size`.
pub(crate) fn page_start(selected: usize, page_size: usize) -> usize {
    (selected / page_size) * page_size
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// The on-glass view controller: owns navigation state, pagination and
/// render-intent generation, and maps normalized gestures onto transitions.
///
/// One instance per app session, explicitly constructed and owned by the
/// hosting application. Events are handled one at a time; each handler runs
/// to completion (cache lookup, optional fetch, render) before the next
/// event is read.
pub struct RedditController<B: HubBridge, S: ContentSource> {
    bridge: B,
    source: S,
    cache: TtlCache,
    config: ControllerConfig,
    view: ViewState,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    selected_index: usize,
    saved_feed_index: usize,
    saved_post_index: usize,
    saved_comment_index: usize,
    ui_initialized: bool,
    last_swipe_ms: Option<u64>,
    event_log: VecDeque<String>,
}

impl<B: HubBridge, S: ContentSource> RedditController<B, S> {
    pub fn new(bridge: B, source: S) -> Self {
        Self::with_config(bridge, source, ControllerConfig::default())
    }

    pub fn with_config(bridge: B, source: S, config: ControllerConfig) -> Self {
        let cache = TtlCache::new(config.cache_ttl_ms);
        Self {
            bridge,
            source,
            cache,
            config,
            view: ViewState::Feeds,
            posts: Vec::new(),
            comments: Vec::new(),
            selected_index: 0,
            saved_feed_index: 0,
            saved_post_index: 1,
            saved_comment_index: 0,
            ui_initialized: false,
            last_swipe_ms: None,
            event_log: VecDeque::new(),
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn saved_comment_index(&self) -> usize {
        self.saved_comment_index
    }

    pub fn current_feed(&self) -> FeedOption {
        FEED_OPTIONS[self.saved_feed_index]
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Diagnostic lines, oldest first. Bounded; see
    /// [`ControllerConfig::event_log_capacity`].
    pub fn event_log(&self) -> impl Iterator<Item = &str> {
        self.event_log.iter().map(String::as_str)
    }

    // -- lifecycle -----------------------------------------------------------

    /// Create the startup page set and show the feed selector, restored to
    /// the last selected feed.
    pub fn init(&mut self) -> Result<()> {
        self.ensure_startup_ui()?;
        self.show_feed_selector()
    }

    /// Re-enter the posts view for the current feed. Public so the hosting
    /// app can force a refresh (the simulator's feed picker uses it).
    pub fn reload_feed(&mut self) -> Result<()> {
        self.load_posts()
    }

    /// Programmatic feed change, clamped to the feed table.
    pub fn select_feed(&mut self, index: usize) -> Result<()> {
        let index = index.min(FEED_OPTIONS.len() - 1);
        self.saved_feed_index = index;
        self.log(format!("feed changed to {}", FEED_OPTIONS[index].label));
        self.load_posts()
    }

    /// Connection-status hook. Informational only, never a transition.
    pub fn note_device_status(&mut self, status: &DeviceStatus) {
        if status.connected {
            let serial = status.serial.as_deref().unwrap_or("");
            self.log(format!("device connected {serial}"));
        }
    }

    fn ensure_startup_ui(&mut self) -> Result<()> {
        if self.ui_initialized {
            return Ok(());
        }

        let spec = self.startup_page();
        let code = self.bridge.create_startup_page(&spec)?;
        if code != 0 {
            self.log(format!("startup page init failed ({code})"));
            return Err(GlassFeedError::BridgeInit { code });
        }

        self.ui_initialized = true;
        Ok(())
    }

    fn log(&mut self, message: String) {
        if self.event_log.len() >= self.config.event_log_capacity {
            self.event_log.pop_front();
        }
        self.event_log.push_back(message);
    }

    // -- event handling ------------------------------------------------------

    /// Handle one raw bridge event, stamping wall-clock time for the swipe
    /// debounce.
    pub fn handle_event(&mut self, event: &HubEvent) -> Result<()> {
        self.handle_event_at(event, util::now_ms())
    }

    /// Deterministic event entry point; `now_ms` only feeds the swipe
    /// debounce, which makes input replay reproducible.
    pub fn handle_event_at(&mut self, event: &HubEvent, now_ms: u64) -> Result<()> {
        if let Some(list_event) = &event.list_event {
            // List selection only exists on the feed screen.
            if normalize_gesture(event) == Gesture::Click && self.view == ViewState::Feeds {
                let selected = match list_event.current_select_item_index {
                    Some(index) => (index.max(0) as usize).min(FEED_OPTIONS.len() - 1),
                    None => self.selected_index,
                };
                self.saved_feed_index = selected;
                self.selected_index = selected;
                self.log(format!("feed selected {}", FEED_OPTIONS[selected].label));
                return self.load_posts();
            }
            return Ok(());
        }

        match normalize_gesture(event) {
            Gesture::ScrollUp => {
                if self.swipe_throttle_ok(now_ms) {
                    self.handle_swipe_left()
                } else {
                    Ok(())
                }
            }
            Gesture::ScrollDown => {
                if self.swipe_throttle_ok(now_ms) {
                    self.handle_swipe_right()
                } else {
                    Ok(())
                }
            }
            Gesture::Click => self.handle_tap(),
            Gesture::DoubleClick => self.handle_double_tap(),
            Gesture::Unknown => {
                self.log("ignored unrecognized input event".to_string());
                Ok(())
            }
        }
    }

    /// Records an accepted swipe. A swipe arriving within the cooldown
    /// window after the previous accepted one is rejected and does not move
    /// the window.
    fn swipe_throttle_ok(&mut self, now_ms: u64) -> bool {
        if let Some(last) = self.last_swipe_ms {
            if now_ms.saturating_sub(last) < self.config.swipe_cooldown_ms {
                return false;
            }
        }
        self.last_swipe_ms = Some(now_ms);
        true
    }

    fn handle_swipe_left(&mut self) -> Result<()> {
        match self.view {
            ViewState::Feeds => Ok(()),
            ViewState::Posts => {
                if self.selected_index <= 1 {
                    return Ok(());
                }
                self.selected_index -= 1;
                self.render_posts_page()
            }
            ViewState::Comments => {
                if self.selected_index == 0 {
                    return Ok(());
                }
                self.selected_index -= 1;
                self.render_comments_page()
            }
            ViewState::CommentDetail => {
                if self.saved_comment_index == 0 {
                    return Ok(());
                }
                self.saved_comment_index -= 1;
                self.render_comment_detail()
            }
        }
    }

    fn handle_swipe_right(&mut self) -> Result<()> {
        match self.view {
            ViewState::Feeds => Ok(()),
            ViewState::Posts => {
                let max = self.posts.len().saturating_sub(1);
                if self.selected_index >= max {
                    return Ok(());
                }
                self.selected_index += 1;
                self.render_posts_page()
            }
            ViewState::Comments => {
                let max = self.comments.len().saturating_sub(1);
                if self.selected_index >= max {
                    return Ok(());
                }
                self.selected_index += 1;
                self.render_comments_page()
            }
            ViewState::CommentDetail => {
                let max = self.comments.len().saturating_sub(1);
                if self.saved_comment_index >= max {
                    return Ok(());
                }
                self.saved_comment_index += 1;
                self.render_comment_detail()
            }
        }
    }

    fn handle_tap(&mut self) -> Result<()> {
        match self.view {
            ViewState::Feeds | ViewState::CommentDetail => Ok(()),
            ViewState::Posts => self.load_comments_for_selected_post(),
            ViewState::Comments => {
                // Deliberately transitions even when the thread came back
                // empty; the detail page then renders blank.
                self.saved_comment_index = self.selected_index;
                self.view = ViewState::CommentDetail;
                self.render_comment_detail()
            }
        }
    }

    fn handle_double_tap(&mut self) -> Result<()> {
        match self.view {
            ViewState::CommentDetail => {
                self.view = ViewState::Comments;
                self.selected_index = self.saved_comment_index;
                self.render_comments_page()
            }
            ViewState::Comments => {
                self.view = ViewState::Posts;
                self.selected_index = self.saved_post_index;
                self.render_posts_page()
            }
            ViewState::Posts => self.show_feed_selector(),
            ViewState::Feeds => Ok(()),
        }
    }

    // -- data loading --------------------------------------------------------

    fn show_feed_selector(&mut self) -> Result<()> {
        self.view = ViewState::Feeds;
        self.selected_index = self.saved_feed_index;
        self.render_feeds_page()
    }

    fn load_posts(&mut self) -> Result<()> {
        self.view = ViewState::Posts;
        self.selected_index = 1;

        let feed = FEED_OPTIONS[self.saved_feed_index];
        let cache_key = format!("reddit:posts:{}", feed.path);
        if let Some(posts) = self.cache.get::<Vec<Post>>(&mut self.bridge, &cache_key) {
            self.posts = posts;
            return self.render_posts_page();
        }

        self.show_loading(&format!("Loading {}...", feed.label))?;

        match self.source.top_posts(&feed, self.config.post_limit) {
            Ok(posts) => {
                self.posts = posts;
                if let Err(e) = self.cache.set(&mut self.bridge, &cache_key, &self.posts) {
                    self.log(format!("cache write failed for {cache_key}: {e}"));
                }
                self.render_posts_page()
            }
            Err(e) => {
                self.log(format!("post load error: {e}"));
                self.show_loading(&format!("Error: {e}"))
            }
        }
    }

    fn load_comments_for_selected_post(&mut self) -> Result<()> {
        let Some(post) = self.posts.get(self.selected_index) else {
            return Ok(());
        };
        if post.permalink.is_empty() || post.num_comments <= 0 {
            return Ok(());
        }
        let permalink = post.permalink.clone();

        self.saved_post_index = self.selected_index;
        self.view = ViewState::Comments;
        self.selected_index = 0;

        let cache_key = format!("reddit:comments:{permalink}");
        if let Some(comments) = self.cache.get::<Vec<Comment>>(&mut self.bridge, &cache_key) {
            self.comments = comments;
            return self.render_comments_page();
        }

        self.show_loading("Loading comments...")?;

        match self.source.comments(&permalink, self.config.comment_limit) {
            Ok(comments) => {
                self.comments = comments;
                if let Err(e) = self.cache.set(&mut self.bridge, &cache_key, &self.comments) {
                    self.log(format!("cache write failed for {cache_key}: {e}"));
                }
                self.render_comments_page()
            }
            Err(e) => {
                self.log(format!("comment load error: {e}"));
                self.comments.clear();
                self.show_loading(&format!("Error: {e}"))?;
                self.render_comments_page()
            }
        }
    }

    // -- render intents ------------------------------------------------------

    fn slot_height(&self) -> u16 {
        SCREEN_HEIGHT / (self.config.items_per_page as u16).max(1)
    }

    fn startup_page(&self) -> PageSpec {
        let height = self.slot_height();
        let texts = (0..self.config.items_per_page)
            .map(|i| TextContainer {
                id: (i + 1) as u8,
                name: format!("item-{}", i + 1),
                x: 0,
                y: i as u16 * height,
                width: SCREEN_WIDTH,
                height,
                border_width: 0,
                content: if i == 0 {
                    "Loading...".to_string()
                } else {
                    String::new()
                },
                event_capture: i == 0,
            })
            .collect();
        PageSpec {
            texts,
            lists: Vec::new(),
        }
    }

    fn render_feeds_page(&mut self) -> Result<()> {
        let names = FEED_OPTIONS
            .iter()
            .map(|feed| {
                let subs = if feed.path.is_empty() {
                    "top".to_string()
                } else {
                    feed.path.replace('+', " ")
                };
                util::truncate_chars(&format!("{} - {}", feed.label, subs), 50).to_string()
            })
            .collect();

        let feed_list = ListContainer {
            id: FEED_LIST_ID,
            name: "feeds".to_string(),
            x: 0,
            y: 0,
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            item_names: names,
            select_border: true,
        };

        self.bridge.rebuild_page(&PageSpec {
            texts: Vec::new(),
            lists: vec![feed_list],
        })
    }

    /// Single full-width message line (loading and error states).
    fn show_loading(&mut self, message: &str) -> Result<()> {
        let height = self.slot_height();
        let texts = (0..self.config.items_per_page)
            .map(|i| TextContainer {
                id: (i + 1) as u8,
                name: format!("item-{}", i + 1),
                x: ITEM_INSET,
                y: i as u16 * height,
                width: SCREEN_WIDTH - 2 * ITEM_INSET,
                height,
                border_width: 0,
                content: if i == 0 {
                    message.to_string()
                } else {
                    String::new()
                },
                event_capture: i == 0,
            })
            .collect();
        self.bridge.rebuild_page(&PageSpec {
            texts,
            lists: Vec::new(),
        })
    }

    fn render_posts_page(&mut self) -> Result<()> {
        let page_size = self.config.items_per_page;
        // The help entry at index 0 is excluded from the paging math and
        // re-added when indexing into the list.
        let adjusted = self.selected_index.saturating_sub(1);
        let start = page_start(adjusted, page_size);
        let slot = adjusted - start;
        let height = self.slot_height();
        let now = util::now_seconds();

        let mut texts = Vec::with_capacity(page_size);
        for i in 0..page_size {
            let post_idx = start + i + 1;
            let post = self.posts.get(post_idx);
            let selected = i == slot && post.is_some();

            let content = match post {
                Some(post) => {
                    let age = util::hours_ago(post.created_utc_seconds, now);
                    let title = util::ellipsize(&post.title, 60);
                    format!(
                        "{title}\n{post_idx}/{} ▲ {} {} - {} comments\n{age}h ago by {}",
                        self.posts.len().saturating_sub(1),
                        post.ups,
                        post.subreddit,
                        post.num_comments,
                        post.author,
                    )
                }
                None => String::new(),
            };

            texts.push(TextContainer {
                id: (i + 1) as u8,
                name: format!("item-{}", i + 1),
                x: ITEM_INSET,
                y: i as u16 * height,
                width: SCREEN_WIDTH - 2 * ITEM_INSET,
                height,
                border_width: if selected { 3 } else { 0 },
                content,
                event_capture: selected,
            });
        }

        self.bridge.rebuild_page(&PageSpec {
            texts,
            lists: Vec::new(),
        })
    }

    fn render_comments_page(&mut self) -> Result<()> {
        let page_size = self.config.items_per_page;
        let start = page_start(self.selected_index, page_size);
        let slot = self.selected_index - start;
        let height = self.slot_height();
        let now = util::now_seconds();

        let mut texts = Vec::with_capacity(page_size);
        for i in 0..page_size {
            let comment_idx = start + i;
            let comment = self.comments.get(comment_idx);
            let selected = i == slot && comment.is_some();

            let (content, x, width) = match comment {
                Some(comment) => {
                    let age = util::hours_ago(comment.created_utc_seconds, now);
                    let indent = ITEM_INSET
                        + comment.depth.saturating_mul(16).min(u32::from(MAX_COMMENT_INDENT))
                            as u16;
                    let width = SCREEN_WIDTH - indent - ITEM_INSET;
                    let collapsed: Vec<&str> = comment.body.split_whitespace().collect();
                    let body = util::ellipsize(&collapsed.join(" "), 100);
                    let content = format!(
                        "{}/{} ▲{} {} {age}h ago\n{body}",
                        comment_idx + 1,
                        self.comments.len(),
                        comment.ups,
                        comment.author,
                    );
                    (content, indent, width)
                }
                None => (String::new(), ITEM_INSET, SCREEN_WIDTH - 2 * ITEM_INSET),
            };

            texts.push(TextContainer {
                id: (i + 1) as u8,
                name: format!("item-{}", i + 1),
                x,
                y: i as u16 * height,
                width,
                height,
                border_width: if selected { 3 } else { 0 },
                content,
                event_capture: selected,
            });
        }

        self.bridge.rebuild_page(&PageSpec {
            texts,
            lists: Vec::new(),
        })
    }

    fn render_comment_detail(&mut self) -> Result<()> {
        let content = match self.comments.get(self.saved_comment_index) {
            Some(comment) => {
                let age = util::hours_ago(comment.created_utc_seconds, util::now_seconds());
                format!(
                    "▲{} {} {age}h ago\n{}",
                    comment.ups,
                    comment.author,
                    comment.body.trim()
                )
            }
            None => String::new(),
        };

        let mut texts = vec![TextContainer {
            id: 1,
            name: "item-1".to_string(),
            x: ITEM_INSET,
            y: 0,
            width: SCREEN_WIDTH - 2 * ITEM_INSET,
            height: SCREEN_HEIGHT,
            border_width: 0,
            content,
            event_capture: true,
        }];
        // Park the unused slots off-screen so the container count stays
        // fixed across rebuilds.
        for i in 1..self.config.items_per_page {
            texts.push(TextContainer {
                id: (i + 1) as u8,
                name: format!("item-{}", i + 1),
                x: 0,
                y: SCREEN_HEIGHT + i as u16,
                width: 1,
                height: 1,
                border_width: 0,
                content: String::new(),
                event_capture: false,
            });
        }

        self.bridge.rebuild_page(&PageSpec {
            texts,
            lists: Vec::new(),
        })
    }
}
