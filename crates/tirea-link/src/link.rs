//! Two-way links between a component and a path in root state.

use crate::{Item, KeyPath, LinkError, LinkOptions, LinkResult, PartialState, Path, PathAccess, Seg};
use std::fmt;
use std::sync::Arc;

/// Reads the current value of a top-level key from the host.
pub type StateFn = Arc<dyn Fn(&str) -> Option<Item> + Send + Sync>;

/// Hands a partial update to the host, which merges it into root state.
pub type CommitFn = Arc<dyn Fn(PartialState) + Send + Sync>;

/// The setter half of a [`Link`].
pub type ChangeFn = Arc<dyn Fn(Item) -> LinkResult<()> + Send + Sync>;

/// Builds [`Link`]s against a host's root state.
///
/// The host is injected as a state getter and a commit callback:
///
/// ```
/// use std::sync::Arc;
/// use tirea_link::{Map, RootState, StateCell};
///
/// let cell = Arc::new(StateCell::new(
///     RootState::new().insert("form", Map::new().insert("name", "old")),
/// ));
/// let linker = cell.linker();
///
/// let link = linker.bind(["form", "name"]).unwrap();
/// assert_eq!(link.value().unwrap(), &"old");
///
/// link.request_change("new").unwrap();
/// assert_eq!(linker.get(["form", "name"]).unwrap().unwrap(), "new");
/// ```
#[derive(Clone)]
pub struct Linker {
    state: StateFn,
    commit: CommitFn,
    options: LinkOptions,
}

/// Where a bound path writes to.
enum Target {
    /// Path of length one: the root item itself is replaced.
    Shallow,
    /// Longer path: splice into the persistent container read at bind time.
    Nested {
        container: Arc<dyn PathAccess + Send + Sync>,
        rest: Path,
    },
}

impl Linker {
    pub fn new<S, C>(state: S, commit: C) -> Self
    where
        S: Fn(&str) -> Option<Item> + Send + Sync + 'static,
        C: Fn(PartialState) + Send + Sync + 'static,
    {
        Self {
            state: Arc::new(state),
            commit: Arc::new(commit),
            options: LinkOptions::default(),
        }
    }

    /// Set the conversion mode used by [`Linker::bind`] and [`Linker::get`].
    #[must_use]
    pub fn with_options(mut self, options: LinkOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> LinkOptions {
        self.options
    }

    /// Bind `path` with the linker's default options.
    pub fn bind(&self, path: impl Into<KeyPath>) -> LinkResult<Link> {
        self.bind_with(path, self.options)
    }

    /// Bind `path` with explicit options.
    ///
    /// Fails with `MissingKey`, `EmptyPath` or `NotPersistentContainer`;
    /// no link is produced in that case.
    pub fn bind_with(&self, path: impl Into<KeyPath>, options: LinkOptions) -> LinkResult<Link> {
        let (path, key, target, value) = self.resolve(path.into(), options)?;
        tracing::debug!(
            root = %key,
            depth = path.len() - 1,
            return_plain = options.return_plain,
            "bind linked state"
        );

        let commit = self.commit.clone();
        let full_path = path.clone();
        let request_change: ChangeFn = Arc::new(move |new_value: Item| -> LinkResult<()> {
            let new_value = if options.write_as_persistent {
                new_value.into_persistent()
            } else {
                new_value
            };

            let (updated, unchanged) = match &target {
                Target::Shallow => (new_value, false),
                Target::Nested { container, rest } => {
                    let next = container
                        .set_in(rest.segments(), new_value.into_node())
                        .map_err(|err| err.under(Seg::key(key.as_str())))?;
                    let unchanged = container
                        .get_in(&[])
                        .is_some_and(|base| base.ptr_eq(&next));
                    (Item::from(next), unchanged)
                }
            };

            tracing::trace!(root = %key, path = %full_path, unchanged, "commit linked state change");
            commit(PartialState::from([(key.clone(), updated)]));
            Ok(())
        });

        Ok(Link {
            path,
            value,
            request_change,
        })
    }

    /// The value `bind(path)` would expose, without building a setter.
    pub fn get(&self, path: impl Into<KeyPath>) -> LinkResult<Option<Item>> {
        self.resolve(path.into(), self.options)
            .map(|(_, _, _, value)| value)
    }

    fn resolve(
        &self,
        path: KeyPath,
        options: LinkOptions,
    ) -> LinkResult<(Path, String, Target, Option<Item>)> {
        let path = path.into_path()?;
        let Some((first, rest)) = path.split_first() else {
            return Err(LinkError::EmptyPath);
        };
        let key = first.root_key().into_owned();
        let root_item = (self.state)(&key);

        let (target, raw) = if rest.is_empty() {
            (Target::Shallow, root_item)
        } else {
            let Some(container) = root_item.and_then(Item::into_path_access) else {
                tracing::debug!(root = %key, "nested path on a non-container state entry");
                return Err(LinkError::not_persistent_container(key));
            };
            let raw = container.get_in(rest).map(Item::from);
            let target = Target::Nested {
                container,
                rest: Path::from(rest),
            };
            (target, raw)
        };

        let value = if options.return_plain {
            raw.map(Item::into_plain)
        } else {
            raw
        };
        Ok((path, key, target, value))
    }
}

impl fmt::Debug for Linker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Linker")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A bound (value, setter) pair.
///
/// The setter splices into the root item read when the link was bound. Two
/// writes through links bound to the same snapshot each start from that
/// snapshot, so the later commit replaces the earlier one. Re-bind after
/// every commit to write against the latest state.
#[derive(Clone)]
pub struct Link {
    path: Path,
    value: Option<Item>,
    request_change: ChangeFn,
}

impl Link {
    /// The value at the bound path, or `None` if nothing is stored there.
    #[inline]
    pub fn value(&self) -> Option<&Item> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<Item> {
        self.value
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `value` at the bound path and commit the updated root entry.
    ///
    /// Errors only when the path cannot be written through the tree (for
    /// example a key applied to a list); nothing is committed then.
    pub fn request_change(&self, value: impl Into<Item>) -> LinkResult<()> {
        (self.request_change)(value.into())
    }

    /// A shareable handle to the setter, for handing to UI callbacks.
    pub fn setter(&self) -> ChangeFn {
        self.request_change.clone()
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("path", &self.path)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Map, RootState};
    use serde_json::json;
    use std::sync::Mutex;

    fn fixed(state: RootState) -> (Linker, Arc<Mutex<Vec<PartialState>>>) {
        let commits = Arc::new(Mutex::new(Vec::new()));
        let sink = commits.clone();
        let linker = Linker::new(
            move |key| state.get(key).cloned(),
            move |partial| sink.lock().unwrap().push(partial),
        );
        (linker, commits)
    }

    #[test]
    fn test_shallow_bind_reads_root_item() {
        let (linker, _) = fixed(RootState::new().insert("a", "wrong"));
        let link = linker.bind("a").unwrap();
        assert_eq!(link.value().unwrap(), &"wrong");
        assert_eq!(link.path(), &crate::path!("a"));
    }

    #[test]
    fn test_shallow_bind_absent_key() {
        let (linker, commits) = fixed(RootState::new());
        let link = linker.bind("missing").unwrap();
        assert!(link.value().is_none());
        link.request_change("v").unwrap();
        assert_eq!(commits.lock().unwrap()[0]["missing"], Item::from("v"));
    }

    #[test]
    fn test_setter_commits_single_key() {
        let (linker, commits) = fixed(
            RootState::new()
                .insert("a", Map::new().insert("b", "old"))
                .insert("other", 1i64),
        );
        linker.bind(["a", "b"]).unwrap().request_change("new").unwrap();

        let commits = commits.lock().unwrap();
        assert_eq!(commits.len(), 1);
        let partial = &commits[0];
        assert_eq!(partial.len(), 1);
        let map = partial["a"].as_map().unwrap();
        assert_eq!(map.get("b").unwrap().to_plain(), json!("new"));
    }

    #[test]
    fn test_nested_on_absent_root_is_not_container() {
        let (linker, _) = fixed(RootState::new());
        let err = linker.bind(["a", "b"]).unwrap_err();
        assert!(matches!(err, LinkError::NotPersistentContainer { ref key } if key == "a"));
    }

    #[test]
    fn test_failed_write_commits_nothing() {
        let (linker, commits) = fixed(
            RootState::new().insert("a", Map::new().insert("b", "leaf")),
        );
        let link = linker.bind(["a", "b", "c"]).unwrap();
        assert!(link.value().is_none());
        let err = link.request_change("x").unwrap_err();
        assert!(matches!(err, LinkError::TypeMismatch { .. }));
        assert!(commits.lock().unwrap().is_empty());
    }

    #[test]
    fn test_write_error_reports_full_path() {
        let list: crate::List = ["x"].into_iter().collect();
        let (linker, commits) = fixed(RootState::new().insert("a", Map::new().insert("l", list)));
        let link = linker
            .bind(vec![Seg::key("a"), "l".into(), 3usize.into()])
            .unwrap();
        let err = link.request_change("y").unwrap_err();
        assert_eq!(err.to_string(), "index 3 out of bounds (len: 1) at path a.l[3]");
        assert!(commits.lock().unwrap().is_empty());
    }

    #[test]
    fn test_nested_write_through_dyn_container() {
        let item = Item::from(Map::new().insert("b", "old"));
        let access: &dyn PathAccess = item.as_path_access().unwrap();
        let next = access
            .set_in(crate::path!("b").segments(), crate::Node::leaf("new"))
            .unwrap();
        assert_eq!(next.to_plain(), json!({"b": "new"}));

        let same = access
            .set_in(crate::path!("b").segments(), crate::Node::leaf("old"))
            .unwrap();
        assert!(access.get_in(&[]).unwrap().ptr_eq(&same));
    }

    #[test]
    fn test_get_uses_default_options() {
        let list: crate::List = ["x"].into_iter().collect();
        let (linker, _) = fixed(RootState::new().insert("a", Map::new().insert("l", list.clone())));
        assert_eq!(linker.get(["a", "l"]).unwrap().unwrap(), json!(["x"]));

        let linker = linker.with_options(LinkOptions::new().retain_persistent());
        let got = linker.get(["a", "l"]).unwrap().unwrap();
        assert!(got.as_list().unwrap().ptr_eq(&list));
    }

    #[test]
    fn test_setter_handle_is_shareable() {
        let (linker, commits) = fixed(RootState::new());
        let setter = linker.bind("a").unwrap().setter();
        let handle = std::thread::spawn(move || setter(Item::from(1i64)));
        handle.join().unwrap().unwrap();
        assert_eq!(commits.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_debug_omits_callbacks() {
        let (linker, _) = fixed(RootState::new().insert("a", "v"));
        let link = linker.bind("a").unwrap();
        let text = format!("{:?}", link);
        assert!(text.contains("Link"));
        assert!(format!("{:?}", linker).contains("options"));
    }
}
