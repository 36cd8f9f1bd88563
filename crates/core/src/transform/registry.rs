use super::Member;
use crate::model::{ElementKind, IndexElement};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{debug, warn};

struct ClassEntry<'a> {
    element: &'a IndexElement,
    link: Rc<str>,
}

/// Classes whose members are being expanded on the way from the index root
/// to a member. Shared between siblings, so pushing is O(1).
pub(crate) struct ExpansionPath {
    class: Rc<str>,
    outer: Option<Rc<ExpansionPath>>,
}

impl ExpansionPath {
    fn push(outer: Option<&Rc<ExpansionPath>>, class: Rc<str>) -> Rc<Self> {
        Rc::new(Self {
            class,
            outer: outer.cloned(),
        })
    }

    /// Adds every class on the path to `visited`.
    pub(super) fn mark_visited(path: Option<&Rc<ExpansionPath>>, visited: &mut HashSet<Rc<str>>) {
        let mut cursor = path;
        while let Some(node) = cursor {
            visited.insert(node.class.clone());
            cursor = node.outer.as_ref();
        }
    }
}

/// Classes by fully-qualified name, used to resolve `inherits` references
/// and typedef aliases.
#[derive(Default)]
pub(super) struct ClassRegistry<'a> {
    classes: HashMap<Rc<str>, ClassEntry<'a>>,
}

impl<'a> ClassRegistry<'a> {
    /// First declaration wins.
    pub(super) fn register(&mut self, element: &'a IndexElement, full_name: &str, full_link: &str) {
        if self.classes.contains_key(full_name) {
            debug!("Duplicate class {}, keeping first declaration", full_name);
            return;
        }
        self.classes.insert(
            Rc::from(full_name),
            ClassEntry {
                element,
                link: Rc::from(full_link),
            },
        );
    }

    pub(super) fn len(&self) -> usize {
        self.classes.len()
    }

    /// Appends the members of class `name` to `out`, linked against that
    /// class's page.
    ///
    /// Constructors, destructors and names already in `declared` are
    /// skipped. With `follow_inherits`, bases of `name` are expanded in place
    /// of their `inherits` element. A class already in `visited` is not
    /// expanded again; callers seed it with the classes on `path` so that a
    /// member pulled in from a class never expands that class a second time.
    ///
    /// Returns the number of members appended.
    pub(super) fn expand(
        &self,
        name: &str,
        follow_inherits: bool,
        path: Option<&Rc<ExpansionPath>>,
        declared: &mut HashSet<&'a str>,
        visited: &mut HashSet<Rc<str>>,
        out: &mut Vec<Member<'a>>,
    ) -> usize {
        let Some((key, entry)) = self.classes.get_key_value(name) else {
            warn!("Cannot expand members of unknown class {}", name);
            return 0;
        };
        if !visited.insert(key.clone()) {
            return 0;
        }

        let class: &'a IndexElement = entry.element;
        let path = ExpansionPath::push(path, key.clone());
        let mut appended = 0;
        for child in class.children() {
            if child.kind() == ElementKind::Inherits {
                if follow_inherits {
                    appended += self.expand(
                        child.local_name(),
                        true,
                        Some(&path),
                        declared,
                        visited,
                        out,
                    );
                }
                continue;
            }
            if child.kind().is_special_member() || !declared.insert(child.local_name()) {
                continue;
            }
            out.push(Member {
                element: child,
                parent_link: Some(entry.link.clone()),
                path: Some(path.clone()),
            });
            appended += 1;
        }
        appended
    }
}
