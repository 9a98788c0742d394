//! Name-keyed component registries
//!
//! Controls, panels and plugins share one registry implementation. An item
//! is either handed over as a live instance or as a factory; factories are
//! built immediately against the owning player and taken through the
//! `init` -> `ready` -> `mounted` lifecycle.

use crate::error::Phase;
use crate::player::{Player, PlayerRef};
use crate::{lock, Error, Result};
use std::any::Any;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

/// Recover the concrete type behind a registered trait object
pub trait AsAny: Any + Send + Sync {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Lifecycle shared by every registrable component.
///
/// Each phase is optional: the defaults do nothing. A phase's success does
/// not gate the next one, only an error stops the build.
pub trait Component: AsAny {
    /// Allocate state
    fn init(&self, _player: &Player) -> Result<()> {
        Ok(())
    }

    /// Declare readiness
    fn ready(&self, _player: &Player) -> Result<()> {
        Ok(())
    }

    /// Attach to the player and other components
    fn mounted(&self, _player: &Player) -> Result<()> {
        Ok(())
    }

    /// Stop acting on the player. Called when the slot is taken over by
    /// another item or unregistered; unsubscribe from events here.
    fn detach(&self, _player: &Player) {}

    /// Installed but hidden from lookups
    fn is_ignored(&self) -> bool {
        false
    }
}

/// Control bar item
pub trait Control: Component {
    /// Hover text
    fn tooltip(&self) -> Option<String> {
        None
    }

    /// Invoked when the control is clicked
    fn activate(&self, _player: &Player) -> Result<()> {
        Ok(())
    }
}

/// Side or modal panel
pub trait Panel: Component {
    fn title(&self) -> String;

    /// Invoked when the panel is shown
    fn open(&self, _player: &Player) -> Result<()> {
        Ok(())
    }
}

/// Feature plugin with no UI of its own
pub trait Plugin: Component {}

/// Builds a component bound to a player
pub type Factory<T> = Arc<dyn Fn(&PlayerRef) -> Arc<T> + Send + Sync>;

/// What can be registered: a ready instance or a factory
pub enum Entry<T: ?Sized> {
    Instance(Arc<T>),
    Factory(Factory<T>),
}

impl<T: ?Sized> Entry<T> {
    pub fn instance(item: Arc<T>) -> Self {
        Entry::Instance(item)
    }

    pub fn factory<F>(f: F) -> Self
    where
        F: Fn(&PlayerRef) -> Arc<T> + Send + Sync + 'static,
    {
        Entry::Factory(Arc::new(f))
    }
}

impl<T: ?Sized> Clone for Entry<T> {
    fn clone(&self) -> Self {
        match self {
            Entry::Instance(item) => Entry::Instance(item.clone()),
            Entry::Factory(f) => Entry::Factory(f.clone()),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for Entry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entry::Instance(_) => write!(f, "Entry::Instance"),
            Entry::Factory(_) => write!(f, "Entry::Factory"),
        }
    }
}

/// What can be looked up: a registered name, or an ad hoc item
pub enum Lookup<T: ?Sized> {
    Name(String),
    Instance(Arc<T>),
    Factory(Factory<T>),
}

impl<T: ?Sized> From<&str> for Lookup<T> {
    fn from(name: &str) -> Self {
        Lookup::Name(name.to_string())
    }
}

impl<T: ?Sized> From<String> for Lookup<T> {
    fn from(name: String) -> Self {
        Lookup::Name(name)
    }
}

impl<T: ?Sized> From<Entry<T>> for Lookup<T> {
    fn from(entry: Entry<T>) -> Self {
        match entry {
            Entry::Instance(item) => Lookup::Instance(item),
            Entry::Factory(f) => Lookup::Factory(f),
        }
    }
}

/// Registry of one component family, owned by a player
pub struct Registry<T: ?Sized> {
    kind: &'static str,
    player: PlayerRef,
    items: Mutex<Vec<(String, Arc<T>)>>,
}

/// Control bar registry
pub type ControlsManager = Registry<dyn Control>;
/// Panel registry
pub type PanelsManager = Registry<dyn Panel>;
/// Plugin registry
pub type PluginManager = Registry<dyn Plugin>;

impl<T> Registry<T>
where
    T: ?Sized + Component,
{
    pub fn new(kind: &'static str, player: PlayerRef) -> Self {
        Self {
            kind,
            player,
            items: Mutex::new(Vec::new()),
        }
    }

    /// Store an item under `name`, replacing any previous one in place.
    /// A replaced item is detached.
    pub fn register(&self, name: &str, entry: Entry<T>) -> Result<Arc<T>> {
        let item = match entry {
            Entry::Instance(item) => item,
            Entry::Factory(factory) => self.build(name, &factory)?,
        };

        let displaced = {
            let mut items = lock(&self.items);
            match items.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => {
                    debug!(kind = self.kind, name, "Replacing registered component");
                    Some(std::mem::replace(&mut slot.1, item.clone()))
                }
                None => {
                    debug!(kind = self.kind, name, "Registered component");
                    items.push((name.to_string(), item.clone()));
                    None
                }
            }
        };
        if let Some(old) = displaced {
            if !Arc::ptr_eq(&old, &item) {
                self.detach(name, &old);
            }
        }
        Ok(item)
    }

    /// Remove and detach `name`. Absent names are ignored.
    pub fn unregister(&self, name: &str) {
        let removed = {
            let mut items = lock(&self.items);
            items
                .iter()
                .position(|(n, _)| n == name)
                .map(|index| items.remove(index).1)
        };
        if let Some(item) = removed {
            self.detach(name, &item);
        }
    }

    /// Resolve a lookup. Ignored items resolve to `None`.
    pub fn get(&self, lookup: impl Into<Lookup<T>>) -> Result<Option<Arc<T>>> {
        let item = match lookup.into() {
            Lookup::Name(name) => self.find(&name),
            Lookup::Instance(item) => Some(item),
            Lookup::Factory(factory) => Some(self.build("<ad hoc>", &factory)?),
        };
        Ok(item.filter(|item| !item.is_ignored()))
    }

    /// Registered item under `name` as its concrete type. `None` when
    /// absent, ignored, or of another type.
    pub fn get_as<C: Component>(&self, name: &str) -> Option<Arc<C>> {
        let item = self.find(name).filter(|item| !item.is_ignored())?;
        AsAny::into_any(item).downcast::<C>().ok()
    }

    /// Whether a slot exists for `name`, ignored or not
    pub fn contains(&self, name: &str) -> bool {
        lock(&self.items).iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.items).is_empty()
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<String> {
        lock(&self.items).iter().map(|(n, _)| n.clone()).collect()
    }

    /// Non-ignored items in registration order
    pub fn visible(&self) -> Vec<(String, Arc<T>)> {
        lock(&self.items)
            .iter()
            .filter(|(_, item)| !item.is_ignored())
            .cloned()
            .collect()
    }

    /// Drop every entry without detaching. Used at teardown, when the
    /// event bus is cleared as well.
    pub fn clear(&self) {
        lock(&self.items).clear();
    }

    fn find(&self, name: &str) -> Option<Arc<T>> {
        lock(&self.items)
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, item)| item.clone())
    }

    fn detach(&self, name: &str, item: &Arc<T>) {
        if let Ok(player) = self.player.upgrade() {
            debug!(kind = self.kind, name, "Detaching component");
            item.detach(&player);
        }
    }

    /// Instantiate and run init, ready and mounted in that order
    fn build(&self, name: &str, factory: &Factory<T>) -> Result<Arc<T>> {
        let player = self.player.upgrade()?;
        let item = factory(&self.player);

        let phases: [(Phase, fn(&T, &Player) -> Result<()>); 3] = [
            (Phase::Init, T::init),
            (Phase::Ready, T::ready),
            (Phase::Mounted, T::mounted),
        ];
        for (phase, run) in phases {
            run(&item, &player).map_err(|e| {
                error!(kind = self.kind, name, %phase, error = %e, "Component lifecycle failed");
                Error::Lifecycle {
                    name: name.to_string(),
                    phase,
                    reason: e.to_string(),
                }
            })?;
        }

        debug!(kind = self.kind, name, "Component built");
        Ok(item)
    }
}

impl<T: ?Sized> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = lock(&self.items).iter().map(|(n, _)| n.clone()).collect();
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("names", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::PlayerConfig;
    use crate::video::HeadlessVideo;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(&'static str, String)>>,
        ignored: AtomicBool,
        detached: AtomicBool,
    }

    impl Recorder {
        fn record(&self, phase: &'static str, player: &Player) {
            self.calls.lock().unwrap().push((phase, player.id().to_string()));
        }
    }

    impl Component for Recorder {
        fn init(&self, player: &Player) -> Result<()> {
            self.record("init", player);
            Ok(())
        }

        fn ready(&self, player: &Player) -> Result<()> {
            self.record("ready", player);
            Ok(())
        }

        fn mounted(&self, player: &Player) -> Result<()> {
            self.record("mounted", player);
            Ok(())
        }

        fn detach(&self, _player: &Player) {
            self.detached.store(true, Ordering::SeqCst);
        }

        fn is_ignored(&self) -> bool {
            self.ignored.load(Ordering::SeqCst)
        }
    }

    impl Control for Recorder {}

    struct Failing;

    impl Component for Failing {
        fn ready(&self, _player: &Player) -> Result<()> {
            Err(Error::plugin("not today"))
        }
    }

    impl Control for Failing {}

    fn player() -> Arc<Player> {
        Player::new(PlayerConfig::default(), Arc::new(HeadlessVideo::default())).unwrap()
    }

    #[test]
    fn test_factory_runs_lifecycle_in_order() {
        let player = player();
        let recorder = Arc::new(Recorder::default());

        let r = recorder.clone();
        player
            .controls()
            .register("rec", Entry::factory(move |_| r.clone() as Arc<dyn Control>))
            .unwrap();

        let id = player.id().to_string();
        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec![("init", id.clone()), ("ready", id.clone()), ("mounted", id)]
        );
    }

    #[test]
    fn test_instance_is_stored_without_lifecycle() {
        let player = player();
        let recorder = Arc::new(Recorder::default());

        player
            .controls()
            .register("rec", Entry::instance(recorder.clone() as Arc<dyn Control>))
            .unwrap();

        assert!(recorder.calls.lock().unwrap().is_empty());
        assert!(player.controls().get("rec").unwrap().is_some());
    }

    #[test]
    fn test_ignored_entry_keeps_slot() {
        let player = player();
        let hidden = Arc::new(Recorder::default());

        player
            .controls()
            .register("btn", Entry::instance(hidden.clone() as Arc<dyn Control>))
            .unwrap();
        hidden.ignored.store(true, Ordering::SeqCst);

        assert!(player.controls().get("btn").unwrap().is_none());
        assert!(player.controls().contains("btn"));
        assert!(player.controls().visible().is_empty());

        // Re-registering with a visible item replaces the slot
        player
            .controls()
            .register("btn", Entry::instance(Arc::new(Recorder::default()) as Arc<dyn Control>))
            .unwrap();
        assert!(player.controls().get("btn").unwrap().is_some());
        assert_eq!(player.controls().names(), vec!["btn".to_string()]);
    }

    #[test]
    fn test_duplicate_name_replaces_in_place() {
        let player = player();
        let controls = player.controls();
        controls.clear();

        let first: Arc<dyn Control> = Arc::new(Recorder::default());
        let second: Arc<dyn Control> = Arc::new(Recorder::default());
        controls.register("a", Entry::instance(first)).unwrap();
        controls.register("b", Entry::instance(Arc::new(Recorder::default()) as Arc<dyn Control>)).unwrap();
        controls.register("a", Entry::instance(second.clone())).unwrap();

        assert_eq!(controls.names(), vec!["a".to_string(), "b".to_string()]);
        let found = controls.get("a").unwrap().unwrap();
        assert!(Arc::ptr_eq(&found, &second));
    }

    #[test]
    fn test_missing_lookups_are_not_errors() {
        let player = player();
        assert!(player.controls().get("nope").unwrap().is_none());
        player.controls().unregister("nope");
        player.controls().unregister("nope");
    }

    #[test]
    fn test_ad_hoc_factory_is_not_stored() {
        let player = player();
        let before = player.controls().len();

        let recorder = Arc::new(Recorder::default());
        let r = recorder.clone();
        let lookup: Lookup<dyn Control> = Entry::factory(move |_| r.clone() as Arc<dyn Control>).into();
        let item = player.controls().get(lookup).unwrap();

        assert!(item.is_some());
        assert_eq!(recorder.calls.lock().unwrap().len(), 3);
        assert_eq!(player.controls().len(), before);
    }

    #[test]
    fn test_lifecycle_failure_is_reported_and_not_stored() {
        let player = player();
        let result = player
            .controls()
            .register("broken", Entry::factory(|_| Arc::new(Failing) as Arc<dyn Control>));

        match result {
            Err(Error::Lifecycle { name, phase, .. }) => {
                assert_eq!(name, "broken");
                assert_eq!(phase, Phase::Ready);
            }
            _ => panic!("expected lifecycle error"),
        }
        assert!(!player.controls().contains("broken"));
    }

    #[test]
    fn test_replaced_and_unregistered_items_are_detached() {
        let player = player();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());

        let f = first.clone();
        player
            .controls()
            .register("rec", Entry::factory(move |_| f.clone() as Arc<dyn Control>))
            .unwrap();
        let s = second.clone();
        player
            .controls()
            .register("rec", Entry::factory(move |_| s.clone() as Arc<dyn Control>))
            .unwrap();

        assert!(first.detached.load(Ordering::SeqCst));
        assert!(!second.detached.load(Ordering::SeqCst));

        player.controls().unregister("rec");
        assert!(second.detached.load(Ordering::SeqCst));
        assert!(!player.controls().contains("rec"));
    }

    #[test]
    fn test_registering_the_same_instance_twice_keeps_it_attached() {
        let player = player();
        let recorder = Arc::new(Recorder::default());
        for _ in 0..2 {
            player
                .controls()
                .register("rec", Entry::instance(recorder.clone() as Arc<dyn Control>))
                .unwrap();
        }
        assert!(!recorder.detached.load(Ordering::SeqCst));
    }

    #[test]
    fn test_get_as_concrete_type() {
        let player = player();
        let recorder = Arc::new(Recorder::default());
        player
            .controls()
            .register("rec", Entry::instance(recorder.clone() as Arc<dyn Control>))
            .unwrap();
        player
            .controls()
            .register("bad", Entry::instance(Arc::new(Failing) as Arc<dyn Control>))
            .unwrap();

        let found = player.controls().get_as::<Recorder>("rec").unwrap();
        assert!(Arc::ptr_eq(&found, &recorder));
        assert!(player.controls().get_as::<Recorder>("bad").is_none());
        assert!(player.controls().get_as::<Recorder>("missing").is_none());

        recorder.ignored.store(true, Ordering::SeqCst);
        assert!(player.controls().get_as::<Recorder>("rec").is_none());
    }
}
