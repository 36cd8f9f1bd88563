//! Depth-first walk that resolves fully-qualified names and links.

mod registry;

use crate::error::Result;
use crate::model::{DEFAULT_SEPARATOR, ElementKind, IndexElement, IndexTree, ScopeStack};
use crate::parser::IndexParser;
use registry::{ClassRegistry, ExpansionPath};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info};

/// Receives every linkable element of an index.
///
/// The walk itself always descends into children; a visitor only observes.
pub trait IndexVisitor {
    /// Called once per linkable element, in depth-first pre-order.
    ///
    /// An error aborts the walk and is returned from [`IndexTransform::run`].
    fn on_item(&mut self, element: &IndexElement, full_name: &str, full_link: &str) -> Result<()> {
        let _ = (element, full_name, full_link);
        Ok(())
    }

    /// Called once after the last item of a successful walk.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Joins scope names into a fully-qualified name.
    pub separator: String,
    /// Do not pull the aliased class's members into a `typedef`.
    pub ignore_typedefs: bool,
    /// Do not pull base class members into classes that `inherits` them.
    pub ignore_inherits: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            ignore_typedefs: false,
            ignore_inherits: false,
        }
    }
}

impl TransformOptions {
    fn expands(&self) -> bool {
        !(self.ignore_typedefs && self.ignore_inherits)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Number of `on_item` calls.
    pub items: usize,
    /// Members pulled in from base classes and typedef aliases.
    pub expanded: usize,
}

/// An element scheduled for a visit, with the full link of the linkable
/// element its own link is relative to and the classes expanded to reach it.
pub(crate) struct Member<'a> {
    element: &'a IndexElement,
    parent_link: Option<Rc<str>>,
    path: Option<Rc<ExpansionPath>>,
}

enum Step<'a> {
    Enter(Member<'a>),
    Leave,
}

pub struct IndexTransform<P> {
    parser: P,
    options: TransformOptions,
}

impl<P: IndexParser> IndexTransform<P> {
    pub fn new(parser: P, options: TransformOptions) -> Self {
        Self { parser, options }
    }

    pub fn load(&self, path: &Path) -> Result<IndexTree> {
        self.parser.parse(path)
    }

    /// Loads the index at `path` and runs `visitor` over it.
    pub fn transform<V>(&self, path: &Path, visitor: &mut V) -> Result<TransformStats>
    where
        V: IndexVisitor + ?Sized,
    {
        let tree = self.load(path)?;
        self.run(&tree, visitor)
    }
}

impl<P> IndexTransform<P> {
    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    pub fn run<V>(&self, tree: &IndexTree, visitor: &mut V) -> Result<TransformStats>
    where
        V: IndexVisitor + ?Sized,
    {
        let registry = if self.options.expands() {
            Some(self.build_registry(tree)?)
        } else {
            None
        };

        let stats = self.walk(tree, registry.as_ref(), &mut |element, full_name, full_link| {
            visitor.on_item(element, full_name, full_link)
        })?;
        visitor.finish()?;

        info!(
            "Index transform complete: {} items, {} expanded members",
            stats.items, stats.expanded
        );
        Ok(stats)
    }

    fn build_registry<'a>(&self, tree: &'a IndexTree) -> Result<ClassRegistry<'a>> {
        let mut registry = ClassRegistry::default();
        self.walk(tree, None, &mut |element, full_name, full_link| {
            if element.kind() == ElementKind::Class {
                registry.register(element, full_name, full_link);
            }
            Ok(())
        })?;
        debug!("Registered {} classes", registry.len());
        Ok(registry)
    }

    /// Pre-order walk over an explicit stack. Without a registry, `inherits`
    /// and typedef aliases are not expanded.
    fn walk<'a>(
        &self,
        tree: &'a IndexTree,
        registry: Option<&ClassRegistry<'a>>,
        on_item: &mut dyn FnMut(&'a IndexElement, &str, &str) -> Result<()>,
    ) -> Result<TransformStats> {
        let mut stats = TransformStats::default();
        let mut scope = ScopeStack::new(self.options.separator.as_str());
        let mut steps = Vec::new();

        let top = self.members(tree.elements(), None, None, None, registry, &mut stats);
        steps.extend(top.into_iter().rev().map(Step::Enter));

        while let Some(step) = steps.pop() {
            let member = match step {
                Step::Enter(member) => member,
                Step::Leave => {
                    scope.pop();
                    continue;
                }
            };
            let element = member.element;
            let own_link = element
                .link()
                .map(|link| resolve_link(member.parent_link.as_deref(), link));

            scope.push(element.local_name());
            if let Some(full_link) = own_link.as_deref() {
                on_item(element, scope.full_name(), full_link)?;
                stats.items += 1;
            }

            // Scopes keep the link context of their parent.
            let context = own_link.or(member.parent_link);
            let members = self.members(
                element.children(),
                element.alias(),
                context.as_ref(),
                member.path.as_ref(),
                registry,
                &mut stats,
            );
            if members.is_empty() {
                scope.pop();
            } else {
                steps.push(Step::Leave);
                steps.extend(members.into_iter().rev().map(Step::Enter));
            }
        }

        Ok(stats)
    }

    /// Members of an element in visiting order: its children, with each
    /// `inherits` replaced by the base's members, then the aliased class's
    /// members for a typedef.
    ///
    /// Classes on `path` are never expanded again, so a member reached
    /// through an expansion cannot pull in the class it came from.
    fn members<'a>(
        &self,
        children: &'a [IndexElement],
        alias: Option<&str>,
        link: Option<&Rc<str>>,
        path: Option<&Rc<ExpansionPath>>,
        registry: Option<&ClassRegistry<'a>>,
        stats: &mut TransformStats,
    ) -> Vec<Member<'a>> {
        let direct = |element: &'a IndexElement| Member {
            element,
            parent_link: link.cloned(),
            path: path.cloned(),
        };

        let Some(registry) = registry else {
            return children
                .iter()
                .filter(|child| child.kind() != ElementKind::Inherits)
                .map(direct)
                .collect();
        };

        let follow_inherits = !self.options.ignore_inherits;
        let mut declared: HashSet<&'a str> = children
            .iter()
            .filter(|child| child.kind() != ElementKind::Inherits)
            .map(IndexElement::local_name)
            .collect();
        let mut visited = HashSet::new();
        ExpansionPath::mark_visited(path, &mut visited);
        let mut members = Vec::with_capacity(children.len());

        for child in children {
            if child.kind() != ElementKind::Inherits {
                members.push(direct(child));
            } else if follow_inherits {
                stats.expanded += registry.expand(
                    child.local_name(),
                    true,
                    path,
                    &mut declared,
                    &mut visited,
                    &mut members,
                );
            }
        }

        if let Some(alias) = alias.filter(|_| !self.options.ignore_typedefs) {
            stats.expanded += registry.expand(
                alias,
                follow_inherits,
                path,
                &mut declared,
                &mut visited,
                &mut members,
            );
        }

        members
    }
}

/// `"."` is the enclosing page itself; other links are relative to it.
fn resolve_link(parent: Option<&str>, link: &str) -> Rc<str> {
    match parent {
        Some(parent) if link == "." => Rc::from(parent),
        Some(parent) if !parent.is_empty() => Rc::from(format!("{parent}/{link}")),
        _ => Rc::from(link),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;
    use crate::parser::XmlIndexParser;

    #[derive(Default)]
    struct Collector {
        items: Vec<(String, String)>,
        finished: usize,
    }

    impl IndexVisitor for Collector {
        fn on_item(&mut self, _: &IndexElement, full_name: &str, full_link: &str) -> Result<()> {
            self.items.push((full_name.to_string(), full_link.to_string()));
            Ok(())
        }

        fn finish(&mut self) -> Result<()> {
            self.finished += 1;
            Ok(())
        }
    }

    fn collect_with(source: &str, options: TransformOptions) -> Vec<(String, String)> {
        let tree = XmlIndexParser::with_separator(&options.separator)
            .parse_str(source, Path::new("test.xml"))
            .unwrap();
        let transform = IndexTransform::new(XmlIndexParser::new(), options);
        let mut collector = Collector::default();
        transform.run(&tree, &mut collector).unwrap();
        assert_eq!(collector.finished, 1);
        collector.items
    }

    fn collect(source: &str) -> Vec<(String, String)> {
        collect_with(source, TransformOptions::default())
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(name, link)| (name.to_string(), link.to_string()))
            .collect()
    }

    #[test]
    fn test_scope_names_are_joined() {
        let items = collect(
            r#"<index>
                <namespace name="std">
                    <class name="vector" link="vector.html"/>
                </namespace>
            </index>"#,
        );
        assert_eq!(items, pairs(&[("std::vector", "vector.html")]));
    }

    #[test]
    fn test_pre_order_visits_children_before_siblings() {
        let items = collect(
            r#"<index>
                <class name="A" link="a">
                    <function name="f" link="f"/>
                    <class name="B" link="b">
                        <function name="g" link="g"/>
                    </class>
                </class>
                <function name="h" link="h"/>
            </index>"#,
        );
        let names: Vec<_> = items.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["A", "A::f", "A::B", "A::B::g", "h"]);
    }

    #[test]
    fn test_member_links_are_relative_to_enclosing_page() {
        let items = collect(
            r#"<index>
                <class name="std::vector" link="cpp/container/vector">
                    <constructor/>
                    <destructor/>
                    <function name="push_back"/>
                    <function name="operator[]" link="operator_at"/>
                    <function name="data" link="."/>
                    <namespace name="detail">
                        <function name="grow" link="grow"/>
                    </namespace>
                </class>
            </index>"#,
        );
        assert_eq!(
            items,
            pairs(&[
                ("std::vector", "cpp/container/vector"),
                ("std::vector::vector", "cpp/container/vector/vector"),
                ("std::vector::~vector", "cpp/container/vector/~vector"),
                ("std::vector::push_back", "cpp/container/vector/push_back"),
                ("std::vector::operator[]", "cpp/container/vector/operator_at"),
                ("std::vector::data", "cpp/container/vector"),
                ("std::vector::detail::grow", "cpp/container/vector/grow"),
            ])
        );
    }

    #[test]
    fn test_inherited_members_use_base_links() {
        let items = collect(
            r#"<index>
                <class name="std::ios_base" link="cpp/io/ios_base">
                    <constructor/>
                    <function name="flags"/>
                    <function name="precision"/>
                </class>
                <class name="std::basic_ios" link="cpp/io/basic_ios">
                    <function name="precision" link="prec"/>
                    <inherits name="std::ios_base"/>
                    <function name="fill"/>
                </class>
            </index>"#,
        );
        assert_eq!(
            items[4..],
            pairs(&[
                ("std::basic_ios", "cpp/io/basic_ios"),
                ("std::basic_ios::precision", "cpp/io/basic_ios/prec"),
                ("std::basic_ios::flags", "cpp/io/ios_base/flags"),
                ("std::basic_ios::fill", "cpp/io/basic_ios/fill"),
            ])[..]
        );
    }

    #[test]
    fn test_inherits_are_transitive_and_cycles_terminate() {
        let source = r#"<index>
                <class name="A" link="a">
                    <function name="fa"/>
                    <inherits name="C"/>
                </class>
                <class name="B" link="b">
                    <function name="fb"/>
                    <inherits name="A"/>
                </class>
                <class name="C" link="c">
                    <function name="fc"/>
                    <inherits name="B"/>
                </class>
            </index>"#;
        let items = collect(source);
        let c_members: Vec<_> = items
            .iter()
            .filter(|(name, _)| name.starts_with("C::"))
            .cloned()
            .collect();
        assert_eq!(
            c_members,
            pairs(&[("C::fc", "c/fc"), ("C::fb", "b/fb"), ("C::fa", "a/fa")])
        );
    }

    #[test]
    fn test_nested_class_inheriting_its_enclosing_class_terminates() {
        let items = collect(
            r#"<index>
                <class name="A" link="a">
                    <function name="f"/>
                    <class name="B" link="b">
                        <inherits name="A"/>
                    </class>
                </class>
            </index>"#,
        );
        assert_eq!(
            items,
            pairs(&[
                ("A", "a"),
                ("A::f", "a/f"),
                ("A::B", "a/b"),
                ("A::B::f", "a/f"),
                ("A::B::B", "a/b"),
            ])
        );
    }

    #[test]
    fn test_nested_typedef_aliasing_its_enclosing_class_terminates() {
        let items = collect(
            r#"<index>
                <class name="A" link="a">
                    <typedef name="self_type" alias="A"/>
                    <function name="f"/>
                </class>
            </index>"#,
        );
        assert_eq!(
            items,
            pairs(&[
                ("A", "a"),
                ("A::self_type", "a/self_type"),
                ("A::self_type::self_type", "a/self_type"),
                ("A::self_type::f", "a/f"),
                ("A::f", "a/f"),
            ])
        );
    }

    #[test]
    fn test_ignore_inherits() {
        let source = r#"<index>
                <class name="Base" link="base"><function name="f"/></class>
                <class name="Derived" link="derived"><inherits name="Base"/></class>
            </index>"#;
        let options = TransformOptions {
            ignore_inherits: true,
            ..Default::default()
        };
        assert_eq!(
            collect_with(source, options),
            pairs(&[("Base", "base"), ("Base::f", "base/f"), ("Derived", "derived")])
        );
    }

    #[test]
    fn test_unknown_base_is_skipped() {
        let items = collect(
            r#"<index>
                <class name="Derived" link="derived">
                    <inherits name="Missing"/>
                    <function name="g"/>
                </class>
            </index>"#,
        );
        assert_eq!(items, pairs(&[("Derived", "derived"), ("Derived::g", "derived/g")]));
    }

    #[test]
    fn test_typedef_alias_expansion() {
        let source = r#"<index>
                <class name="std::basic_string" link="cpp/string/basic_string">
                    <constructor/>
                    <function name="size"/>
                </class>
                <typedef name="std::string" link="cpp/string/basic_string" alias="std::basic_string"/>
            </index>"#;
        let items = collect(source);
        assert_eq!(
            items[3..],
            pairs(&[
                ("std::string", "cpp/string/basic_string"),
                ("std::string::size", "cpp/string/basic_string/size"),
            ])[..]
        );

        let options = TransformOptions {
            ignore_typedefs: true,
            ..Default::default()
        };
        let items = collect_with(source, options);
        assert_eq!(items.last().unwrap().0, "std::string");
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn test_custom_separator() {
        let options = TransformOptions {
            separator: ".".to_string(),
            ..Default::default()
        };
        let items = collect_with(
            r#"<index>
                <namespace name="java"><namespace name="util">
                    <class name="List" link="List.html"><constructor/></class>
                </namespace></namespace>
            </index>"#,
            options,
        );
        assert_eq!(
            items,
            pairs(&[("java.util.List", "List.html"), ("java.util.List.List", "List.html/List")])
        );
    }

    #[test]
    fn test_stats_count_items_and_expansions() {
        let tree = XmlIndexParser::new()
            .parse_str(
                r#"<index>
                    <class name="Base" link="base"><function name="f"/><function name="g"/></class>
                    <class name="Derived" link="derived"><inherits name="Base"/></class>
                </index>"#,
                Path::new("test.xml"),
            )
            .unwrap();
        let transform = IndexTransform::new(XmlIndexParser::new(), TransformOptions::default());
        let stats = transform.run(&tree, &mut Collector::default()).unwrap();
        assert_eq!(stats, TransformStats { items: 6, expanded: 2 });
    }

    #[test]
    fn test_visitor_error_aborts_walk() {
        struct FailAfter(usize);
        impl IndexVisitor for FailAfter {
            fn on_item(&mut self, _: &IndexElement, _: &str, _: &str) -> Result<()> {
                if self.0 == 0 {
                    return Err(IndexError::Io(std::io::Error::other("disk full")));
                }
                self.0 -= 1;
                Ok(())
            }

            fn finish(&mut self) -> Result<()> {
                panic!("finish must not run after a failed walk");
            }
        }

        let tree = IndexTree::new(vec![
            IndexElement::linkable(ElementKind::Function, "a", "a", vec![]),
            IndexElement::linkable(ElementKind::Function, "b", "b", vec![]),
            IndexElement::linkable(ElementKind::Function, "c", "c", vec![]),
        ]);
        let transform = IndexTransform::new(XmlIndexParser::new(), TransformOptions::default());
        let mut visitor = FailAfter(2);
        let err = transform.run(&tree, &mut visitor).unwrap_err();
        assert!(matches!(err, IndexError::Io(_)));
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let depth = 100_000;
        let mut source = String::from("<index>");
        for _ in 0..depth {
            source.push_str(r#"<namespace name="n">"#);
        }
        source.push_str(r#"<function name="leaf" link="leaf.html"/>"#);
        for _ in 0..depth {
            source.push_str("</namespace>");
        }
        source.push_str("</index>");

        let tree = XmlIndexParser::new()
            .parse_str(&source, Path::new("deep.xml"))
            .unwrap();
        assert_eq!(tree.element_count(), depth + 1);
        assert_eq!(tree.linkable_count(), 1);

        let transform = IndexTransform::new(XmlIndexParser::new(), TransformOptions::default());
        let mut collector = Collector::default();
        transform.run(&tree, &mut collector).unwrap();

        assert_eq!(collector.items.len(), 1);
        let (name, link) = &collector.items[0];
        assert_eq!(name.len(), depth * "n::".len() + "leaf".len());
        assert!(name.starts_with("n::n::"));
        assert!(name.ends_with("::n::leaf"));
        assert_eq!(link, "leaf.html");
    }

    #[test]
    fn test_options_load_from_json_with_defaults() {
        let options: TransformOptions =
            serde_json::from_str(r#"{"separator": ".", "ignore_inherits": true}"#).unwrap();
        assert_eq!(
            options,
            TransformOptions {
                separator: ".".to_string(),
                ignore_typedefs: false,
                ignore_inherits: true,
            }
        );

        let options: TransformOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, TransformOptions::default());

        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(serde_json::from_str::<TransformOptions>(&json).unwrap(), options);
    }
}
