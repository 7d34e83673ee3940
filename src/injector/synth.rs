/// Code generation for injected members
///
/// Every function here is pure: it returns an unattached `Fragment` that the
/// insertion engine moves into the tree.
use crate::injector::binding::BindingStrategy;
use crate::injector::element::Element;
use crate::source::{ClassDecl, Fragment};

/// Marker placed in generated documentation comments
pub const AUTHOR_MARKER: &str = "@author viewbind, generated view bindings";

/// `@<Annotation>(<id>) <Type> <field>;`
pub fn field(element: &Element, strategy: &dyn BindingStrategy) -> Fragment {
    Fragment::Field(format!(
        "@{}({}) {} {};",
        strategy.field_annotation_canonical_name(),
        element.full_id(),
        element.type_name(),
        element.field_name
    ))
}

/// One field per used element, in input order.
pub fn fields(elements: &[Element], strategy: &dyn BindingStrategy) -> Vec<Fragment> {
    elements
        .iter()
        .filter(|e| e.used)
        .map(|e| field(e, strategy))
        .collect()
}

pub fn holder_comment(layout: &str, holder_name: &str) -> Fragment {
    Fragment::Comment(format!(
        "/**\n * This class contains all view bindings of layout file '{}'\n * for easy reuse in a list adapter: create one `{}` per row\n * and keep it as the row view's tag.\n *\n * {}\n */",
        layout, holder_name, AUTHOR_MARKER
    ))
}

/// Static nested class whose constructor binds the given row view.
pub fn holder_class(
    holder_name: &str,
    elements: &[Element],
    strategy: &dyn BindingStrategy,
) -> Fragment {
    let mut decl = ClassDecl::new(holder_name);
    decl.modifiers.push("static".to_string());

    let constructor = Fragment::Method {
        annotations: vec![],
        signature: format!("{}(android.view.View view)", holder_name),
        body: vec![Fragment::Statement(format!(
            "{}(this, view);",
            strategy.canonical_bind_statement()
        ))],
    };

    let mut members = vec![constructor];
    members.extend(fields(elements, strategy));
    Fragment::Class { decl, members }
}

pub fn on_create_stub(strategy: &dyn BindingStrategy) -> Fragment {
    Fragment::Method {
        annotations: vec!["@Override".to_string()],
        signature: "protected void onCreate(android.os.Bundle savedInstanceState)".to_string(),
        body: vec![
            Fragment::Statement("super.onCreate(savedInstanceState);".to_string()),
            Fragment::Comment("// TODO: add setContentView(...) invocation".to_string()),
            activity_bind_statement(strategy),
        ],
    }
}

pub fn on_create_view_stub(strategy: &dyn BindingStrategy) -> Fragment {
    Fragment::Method {
        annotations: vec!["@Override".to_string()],
        signature: "public android.view.View onCreateView(android.view.LayoutInflater inflater, android.view.ViewGroup container, android.os.Bundle savedInstanceState)".to_string(),
        body: vec![
            Fragment::Comment("// TODO: inflate a fragment view".to_string()),
            Fragment::Statement(
                "android.view.View rootView = super.onCreateView(inflater, container, savedInstanceState);"
                    .to_string(),
            ),
            view_bind_statement(strategy, "rootView"),
            Fragment::Statement("return rootView;".to_string()),
        ],
    }
}

pub fn on_destroy_view_stub(strategy: &dyn BindingStrategy) -> Fragment {
    Fragment::Method {
        annotations: vec!["@Override".to_string()],
        signature: "public void onDestroyView()".to_string(),
        body: vec![
            Fragment::Statement("super.onDestroyView();".to_string()),
            unbind_statement(strategy),
        ],
    }
}

/// Framework types used by the lifecycle stubs and the holder constructor
const FRAMEWORK_TYPES: &[&str] = &[
    "android.os.Bundle",
    "android.view.LayoutInflater",
    "android.view.View",
    "android.view.ViewGroup",
];

/// Canonical top-level type names that generated code may reference.
pub fn generated_types(elements: &[Element], strategy: &dyn BindingStrategy) -> Vec<String> {
    let mut types: Vec<String> = FRAMEWORK_TYPES.iter().map(|t| t.to_string()).collect();
    types.push(strategy.field_annotation_canonical_name().to_string());
    for call in [
        strategy.canonical_bind_statement(),
        strategy.canonical_unbind_statement(),
    ] {
        if let Some((owner, _)) = call.rsplit_once('.') {
            types.push(owner.to_string());
        }
    }
    types.extend(elements.iter().filter(|e| e.used).map(Element::type_name));
    types.iter().map(|t| top_level_type(t)).collect()
}

/// `a.b.Outer.Inner` -> `a.b.Outer`
fn top_level_type(name: &str) -> String {
    let mut segments = Vec::new();
    for segment in name.split('.') {
        segments.push(segment);
        if segment.starts_with(|c: char| c.is_uppercase()) {
            break;
        }
    }
    segments.join(".")
}

/// `<bind>(this);`
pub fn activity_bind_statement(strategy: &dyn BindingStrategy) -> Fragment {
    Fragment::Statement(format!("{}(this);", strategy.canonical_bind_statement()))
}

/// `<bind>(this, <view>);`
pub fn view_bind_statement(strategy: &dyn BindingStrategy, view: &str) -> Fragment {
    Fragment::Statement(format!(
        "{}(this, {});",
        strategy.canonical_bind_statement(),
        view
    ))
}

/// `<unbind>(this);`
pub fn unbind_statement(strategy: &dyn BindingStrategy) -> Fragment {
    Fragment::Statement(format!("{}(this);", strategy.canonical_unbind_statement()))
}
