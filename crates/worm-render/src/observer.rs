//! Observer coordination
//!
//! Turns window resizes, scrolls, root resizes and foreign DOM mutations
//! into throttled re-plan requests. Mutations caused by the layer's own
//! elements are classified as owned and ignored, which keeps renders from
//! retriggering themselves.

use worm_anchor::is_owned;
use worm_dom::{
    Document, DomTree, MutationObserver, MutationObserverInit, MutationRecord, MutationType,
    NodeId, ResizeObserver,
};

use crate::config::RenderConfig;
use crate::throttle::Throttle;

/// Who caused a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOrigin {
    /// The annotation layer's own elements
    Owned,
    /// The page
    Foreign,
}

/// Classify one mutation record
///
/// Owned when the target sits inside an owned element, or when a childList
/// change only adds and removes owned nodes.
pub fn classify(tree: &DomTree, record: &MutationRecord) -> MutationOrigin {
    if is_owned(tree, record.target) {
        return MutationOrigin::Owned;
    }
    if record.mutation_type == MutationType::ChildList {
        let mut changed = record.added_nodes.iter().chain(&record.removed_nodes).peekable();
        if changed.peek().is_some() && changed.all(|&n| is_owned(tree, n)) {
            return MutationOrigin::Owned;
        }
    }
    MutationOrigin::Foreign
}

/// Why a re-plan was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplanReason {
    WindowResize,
    RootResize,
    Mutation,
}

/// Work the layer should do after a poll
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinatorSignals {
    /// A throttled re-plan fired
    pub replan: Option<ReplanReason>,
    /// Scrolling state changed to this value
    pub scrolling: Option<bool>,
    /// Overlay hosts whose size changed
    pub resized_hosts: Vec<NodeId>,
}

impl CoordinatorSignals {
    pub fn is_empty(&self) -> bool {
        self.replan.is_none() && self.scrolling.is_none() && self.resized_hosts.is_empty()
    }
}

#[derive(Debug)]
pub struct ObserverCoordinator {
    config: RenderConfig,
    running: bool,
    mutations: MutationObserver,
    root_resize: ResizeObserver,
    host_resize: Option<ResizeObserver>,
    replan: Throttle<ReplanReason>,
    fired: Option<ReplanReason>,
    scrolling: bool,
    scroll_idle_at: Option<u64>,
    scroll_changed: Option<bool>,
    owned_records: u64,
    foreign_records: u64,
}

impl ObserverCoordinator {
    pub fn new(config: RenderConfig) -> Self {
        let replan = Throttle::new(config.throttle_ms);
        Self {
            config,
            running: false,
            mutations: MutationObserver::new(),
            root_resize: ResizeObserver::new(),
            host_resize: None,
            replan,
            fired: None,
            scrolling: false,
            scroll_idle_at: None,
            scroll_changed: None,
            owned_records: 0,
            foreign_records: 0,
        }
    }

    /// Start observing; a no-op when already running
    pub fn start(&mut self, doc: &mut Document) {
        if self.running {
            return;
        }
        doc.ensure_layout();
        let body = doc.body_or_root();
        let root = doc.document_element().unwrap_or(body);
        self.mutations
            .observe(doc.tree_mut(), body, MutationObserverInit::all_subtree());
        self.root_resize.observe(doc.tree(), root);
        self.running = true;
        tracing::debug!(%body, %root, "observers started");
    }

    /// Disconnect every observer and clear timers
    pub fn stop(&mut self, doc: &mut Document) {
        self.mutations.disconnect(doc.tree_mut());
        self.root_resize.disconnect();
        self.disconnect_host_observer();
        self.replan.cancel();
        self.fired = None;
        self.scrolling = false;
        self.scroll_idle_at = None;
        self.scroll_changed = None;
        if self.running {
            tracing::debug!("observers stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Mutation records seen, as (owned, foreign)
    pub fn record_counts(&self) -> (u64, u64) {
        (self.owned_records, self.foreign_records)
    }

    /// Re-plans that actually fired
    pub fn replans(&self) -> u64 {
        self.replan.fires()
    }

    pub fn on_window_resize(&mut self, now: u64) {
        if self.running {
            self.request_replan(now, ReplanReason::WindowResize);
        }
    }

    /// Scroll event; markers fade until the page has been still for a while
    pub fn on_scroll(&mut self, now: u64) {
        if !self.running {
            return;
        }
        if !self.scrolling {
            self.scrolling = true;
            self.scroll_changed = Some(true);
        }
        self.scroll_idle_at = Some(now + self.config.scroll_idle_ms);
    }

    /// Watch an overlay host; the secondary observer is created on first use
    pub fn observe_host(&mut self, tree: &DomTree, host: NodeId) {
        self.host_resize
            .get_or_insert_with(ResizeObserver::new)
            .observe(tree, host);
    }

    pub fn unobserve_host(&mut self, host: NodeId) {
        if let Some(observer) = self.host_resize.as_mut() {
            observer.unobserve(host);
        }
    }

    /// Make the watch list exactly `hosts`
    pub fn watch_hosts(&mut self, tree: &DomTree, hosts: &[NodeId]) {
        let stale: Vec<NodeId> = self
            .host_resize
            .iter()
            .flat_map(|o| o.targets())
            .filter(|t| !hosts.contains(t))
            .collect();
        for host in stale {
            self.unobserve_host(host);
        }
        for &host in hosts {
            if !self.is_observing_host(host) {
                self.observe_host(tree, host);
            }
        }
    }

    pub fn disconnect_host_observer(&mut self) {
        if let Some(observer) = self.host_resize.as_mut() {
            observer.disconnect();
        }
    }

    pub fn is_observing_host(&self, host: NodeId) -> bool {
        self.host_resize
            .as_ref()
            .is_some_and(|o| o.is_observing(host))
    }

    /// Drain observers and timers up to `now`
    pub fn poll(&mut self, doc: &mut Document, now: u64) -> CoordinatorSignals {
        let mut signals = CoordinatorSignals {
            scrolling: self.scroll_changed.take(),
            ..CoordinatorSignals::default()
        };
        if !self.running {
            return signals;
        }

        doc.ensure_layout();
        let records = self.mutations.take_records(doc.tree_mut());
        let mut foreign = 0;
        for record in &records {
            match classify(doc.tree(), record) {
                MutationOrigin::Owned => self.owned_records += 1,
                MutationOrigin::Foreign => {
                    self.foreign_records += 1;
                    foreign += 1;
                }
            }
        }
        let root_resized = !self.root_resize.check_sizes(doc.tree()).is_empty();

        // One request per poll: a page change that also resizes the root
        // still counts once.
        if foreign > 0 {
            tracing::trace!(foreign, total = records.len(), "foreign mutations");
            self.request_replan(now, ReplanReason::Mutation);
        } else if root_resized {
            self.request_replan(now, ReplanReason::RootResize);
        }

        if let Some(observer) = self.host_resize.as_mut() {
            signals.resized_hosts = observer
                .check_sizes(doc.tree())
                .into_iter()
                .map(|entry| entry.target)
                .collect();
        }

        if let Some(reason) = self.replan.poll(now) {
            self.fired = Some(reason);
        }
        signals.replan = self.fired.take();

        if self.scroll_idle_at.is_some_and(|at| now >= at) {
            self.scroll_idle_at = None;
            self.scrolling = false;
            signals.scrolling = match signals.scrolling {
                Some(true) => None,
                _ => Some(false),
            };
        }
        signals
    }

    fn request_replan(&mut self, now: u64, reason: ReplanReason) {
        if let Some(reason) = self.replan.call(now, reason) {
            self.fired = Some(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worm_anchor::OWNED_ATTR;

    fn started(html: &str) -> (Document, ObserverCoordinator) {
        let mut doc = worm_html::parse(html);
        let mut coordinator = ObserverCoordinator::new(RenderConfig::default());
        coordinator.start(&mut doc);
        (doc, coordinator)
    }

    fn first(doc: &Document, selector: &str) -> NodeId {
        doc.tree().query_selector(doc.tree().root(), selector).unwrap().unwrap()
    }

    #[test]
    fn test_classify_owned_and_foreign() {
        let (mut doc, mut coordinator) = started("<body><p>x</p></body>");
        let p = first(&doc, "p");
        let tree = doc.tree_mut();
        let marker = tree.create_element("div");
        tree.set_attribute(marker, OWNED_ATTR, "true").unwrap();
        tree.append_child(p, marker).unwrap();
        tree.set_style_property(marker, "left", "10%").unwrap();
        tree.set_attribute(p, "title", "t").unwrap();

        let records = coordinator.mutations.take_records(doc.tree_mut());
        let origins: Vec<_> = records.iter().map(|r| classify(doc.tree(), r)).collect();
        assert_eq!(
            origins,
            vec![
                MutationOrigin::Owned,
                MutationOrigin::Owned,
                MutationOrigin::Owned,
                MutationOrigin::Foreign
            ]
        );
    }

    #[test]
    fn test_owned_mutations_do_not_replan() {
        let (mut doc, mut coordinator) = started("<body><p>x</p></body>");
        let p = first(&doc, "p");
        let tree = doc.tree_mut();
        let marker = tree.create_element("div");
        tree.set_attribute(marker, OWNED_ATTR, "true").unwrap();
        tree.append_child(p, marker).unwrap();

        let signals = coordinator.poll(&mut doc, 0);
        assert!(signals.is_empty());
        assert_eq!(coordinator.record_counts(), (2, 0));
    }

    #[test]
    fn test_foreign_mutations_are_throttled() {
        let (mut doc, mut coordinator) = started("<body><p>x</p></body>");
        let p = first(&doc, "p");

        doc.tree_mut().set_attribute(p, "class", "a").unwrap();
        assert_eq!(coordinator.poll(&mut doc, 0).replan, Some(ReplanReason::Mutation));

        doc.tree_mut().set_attribute(p, "class", "b").unwrap();
        assert_eq!(coordinator.poll(&mut doc, 30).replan, None);
        doc.tree_mut().set_attribute(p, "class", "c").unwrap();
        assert_eq!(coordinator.poll(&mut doc, 60).replan, None);
        assert_eq!(coordinator.poll(&mut doc, 100).replan, Some(ReplanReason::Mutation));
        assert_eq!(coordinator.poll(&mut doc, 500).replan, None);
        assert_eq!(coordinator.replans(), 2);
    }

    #[test]
    fn test_window_and_root_resize() {
        let (mut doc, mut coordinator) = started("<body><p>x</p></body>");
        coordinator.on_window_resize(0);
        assert_eq!(coordinator.poll(&mut doc, 0).replan, Some(ReplanReason::WindowResize));

        doc.set_viewport(500.0, 400.0);
        assert_eq!(coordinator.poll(&mut doc, 200).replan, Some(ReplanReason::RootResize));
    }

    #[test]
    fn test_scroll_fades_then_settles() {
        let (mut doc, mut coordinator) = started("<body><p>x</p></body>");

        coordinator.on_scroll(0);
        assert_eq!(coordinator.poll(&mut doc, 10).scrolling, Some(true));
        coordinator.on_scroll(100);
        assert_eq!(coordinator.poll(&mut doc, 200).scrolling, None);
        assert!(coordinator.is_scrolling());
        assert_eq!(coordinator.poll(&mut doc, 250).scrolling, Some(false));
        assert!(!coordinator.is_scrolling());
    }

    #[test]
    fn test_host_observer_reports_resized_hosts() {
        let (mut doc, mut coordinator) =
            started(r#"<body><img id="i" src="/a.png" width="100" height="50"></body>"#);
        let img = doc.get_element_by_id("i").unwrap();
        assert!(!coordinator.is_observing_host(img));

        coordinator.observe_host(doc.tree(), img);
        assert!(coordinator.poll(&mut doc, 0).resized_hosts.is_empty());

        doc.tree_mut().set_attribute(img, "width", "200").unwrap();
        let signals = coordinator.poll(&mut doc, 1);
        assert_eq!(signals.resized_hosts, vec![img]);

        coordinator.disconnect_host_observer();
        assert!(!coordinator.is_observing_host(img));
    }

    #[test]
    fn test_watch_hosts_replaces_list() {
        let (doc, mut coordinator) = started(
            r#"<body><img id="a" src="/a.png" width="10" height="10"><img id="b" src="/b.png" width="10" height="10"></body>"#,
        );
        let a = doc.get_element_by_id("a").unwrap();
        let b = doc.get_element_by_id("b").unwrap();

        coordinator.watch_hosts(doc.tree(), &[a, b]);
        assert!(coordinator.is_observing_host(a) && coordinator.is_observing_host(b));
        coordinator.watch_hosts(doc.tree(), &[b]);
        assert!(!coordinator.is_observing_host(a));
        assert!(coordinator.is_observing_host(b));
        coordinator.watch_hosts(doc.tree(), &[]);
        assert!(!coordinator.is_observing_host(b));
    }

    #[test]
    fn test_stop_disconnects() {
        let (mut doc, mut coordinator) = started("<body><p>x</p></body>");
        let p = first(&doc, "p");
        coordinator.on_scroll(0);
        coordinator.stop(&mut doc);

        assert!(!doc.tree().is_recording());
        doc.tree_mut().set_attribute(p, "class", "a").unwrap();
        coordinator.on_window_resize(10);
        assert!(coordinator.poll(&mut doc, 1000).is_empty());
        assert!(!coordinator.is_running());
    }
}
