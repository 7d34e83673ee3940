/// Structural insertion: where generated members and statements go
///
/// Lifecycle methods follow one merge rule. A missing method gets the full
/// stub; a method that already contains the short bind/unbind form is left
/// alone; otherwise exactly one statement is spliced next to an anchor.
use crate::injector::binding::BindingStrategy;
use crate::injector::definitions::LAYOUT_RESOURCE_MARKER;
use crate::injector::element::Element;
use crate::injector::synth;
use crate::injector::{Change, InjectError, SkipReason};
use crate::source::{Fragment, NodeId, SourceTree, StatementKind};

const ON_CREATE: &str = "onCreate";
const ON_CREATE_VIEW: &str = "onCreateView";
const ON_DESTROY_VIEW: &str = "onDestroyView";
const SET_CONTENT_VIEW: &str = "setContentView";

/// Local that holds an inflated layout after a return rewrite
const INFLATED_VIEW_NAME: &str = "view";

/// Append one field per used element to the end of `class`.
pub fn append_fields(
    tree: &mut SourceTree,
    class: NodeId,
    elements: &[Element],
    strategy: &dyn BindingStrategy,
    changes: &mut Vec<Change>,
) {
    for element in elements.iter().filter(|e| e.used) {
        tree.attach(class, synth::field(element, strategy));
        changes.push(Change::FieldAdded {
            field: element.field_name.clone(),
        });
    }
}

/// Append the documentation comment and the holder class to `class`.
pub fn append_holder(
    tree: &mut SourceTree,
    class: NodeId,
    holder_name: &str,
    layout: &str,
    elements: &[Element],
    strategy: &dyn BindingStrategy,
    changes: &mut Vec<Change>,
) {
    tree.attach(class, synth::holder_comment(layout, holder_name));
    tree.attach(class, synth::holder_class(holder_name, elements, strategy));
    changes.push(Change::HolderAdded {
        class: holder_name.to_string(),
    });
}

pub fn bind_activity(
    tree: &mut SourceTree,
    class: NodeId,
    strategy: &dyn BindingStrategy,
    changes: &mut Vec<Change>,
) -> Result<(), InjectError> {
    let Some(block) = lifecycle_body(tree, class, ON_CREATE)? else {
        create_method(tree, class, ON_CREATE, synth::on_create_stub(strategy), changes);
        return Ok(());
    };
    if contains_line(tree, block, strategy.simple_bind_statement()) {
        changes.push(skipped(ON_CREATE, SkipReason::AlreadyBound));
        return Ok(());
    }

    let anchor = tree
        .statements(block)
        .into_iter()
        .find(|id| tree.statement(*id).and_then(|s| s.call()) == Some(SET_CONTENT_VIEW));
    let Some(anchor) = anchor else {
        changes.push(skipped(ON_CREATE, SkipReason::NoAnchor));
        return Ok(());
    };

    let statement = insert_statement_after(tree, anchor, synth::activity_bind_statement(strategy));
    changes.push(Change::StatementInserted {
        method: ON_CREATE.to_string(),
        statement,
    });
    Ok(())
}

pub fn bind_fragment(
    tree: &mut SourceTree,
    class: NodeId,
    strategy: &dyn BindingStrategy,
    changes: &mut Vec<Change>,
) -> Result<(), InjectError> {
    bind_fragment_view(tree, class, strategy, changes)?;
    unbind_fragment_view(tree, class, strategy, changes)
}

fn bind_fragment_view(
    tree: &mut SourceTree,
    class: NodeId,
    strategy: &dyn BindingStrategy,
    changes: &mut Vec<Change>,
) -> Result<(), InjectError> {
    let Some(block) = lifecycle_body(tree, class, ON_CREATE_VIEW)? else {
        create_method(
            tree,
            class,
            ON_CREATE_VIEW,
            synth::on_create_view_stub(strategy),
            changes,
        );
        return Ok(());
    };
    if contains_line(tree, block, strategy.simple_bind_statement()) {
        changes.push(skipped(ON_CREATE_VIEW, SkipReason::AlreadyBound));
        return Ok(());
    }

    // only the first return is considered
    let first_return = tree
        .statements(block)
        .into_iter()
        .find_map(|id| match tree.statement(id) {
            Some(stmt) if matches!(stmt.kind, StatementKind::Return { .. }) => {
                Some((id, stmt.return_value().map(str::to_string)))
            }
            _ => None,
        });
    let Some((anchor, value)) = first_return else {
        changes.push(skipped(ON_CREATE_VIEW, SkipReason::NoAnchor));
        return Ok(());
    };
    let Some(value) = value else {
        changes.push(skipped(ON_CREATE_VIEW, SkipReason::NoReturnValue));
        return Ok(());
    };

    if value.contains(LAYOUT_RESOURCE_MARKER) {
        let local = Fragment::Statement(format!(
            "android.view.View {} = {};",
            INFLATED_VIEW_NAME, value
        ));
        for fragment in [local, synth::view_bind_statement(strategy, INFLATED_VIEW_NAME)] {
            let statement = insert_statement_before(tree, anchor, fragment);
            changes.push(Change::StatementInserted {
                method: ON_CREATE_VIEW.to_string(),
                statement,
            });
        }
        let rewritten = tree.build(Fragment::Statement(format!(
            "return {};",
            INFLATED_VIEW_NAME
        )));
        tree.replace(anchor, rewritten);
        changes.push(Change::ReturnRewritten {
            method: ON_CREATE_VIEW.to_string(),
        });
    } else {
        let statement =
            insert_statement_before(tree, anchor, synth::view_bind_statement(strategy, &value));
        changes.push(Change::StatementInserted {
            method: ON_CREATE_VIEW.to_string(),
            statement,
        });
    }
    Ok(())
}

fn unbind_fragment_view(
    tree: &mut SourceTree,
    class: NodeId,
    strategy: &dyn BindingStrategy,
    changes: &mut Vec<Change>,
) -> Result<(), InjectError> {
    let Some(block) = lifecycle_body(tree, class, ON_DESTROY_VIEW)? else {
        create_method(
            tree,
            class,
            ON_DESTROY_VIEW,
            synth::on_destroy_view_stub(strategy),
            changes,
        );
        return Ok(());
    };
    if contains_line(tree, block, strategy.simple_unbind_statement()) {
        changes.push(skipped(ON_DESTROY_VIEW, SkipReason::AlreadyBound));
        return Ok(());
    }

    let fragment = synth::unbind_statement(strategy);
    let statement = match tree.statements(block).last() {
        Some(&last) => insert_statement_before(tree, last, fragment),
        None => {
            let id = tree.attach(block, fragment);
            statement_text(tree, id)
        }
    };
    changes.push(Change::StatementInserted {
        method: ON_DESTROY_VIEW.to_string(),
        statement,
    });
    Ok(())
}

/// Body block of the first declared method named `name`. A method without a
/// body cannot be merged into and aborts the edit.
fn lifecycle_body(
    tree: &SourceTree,
    class: NodeId,
    name: &str,
) -> Result<Option<NodeId>, InjectError> {
    let Some(&method) = tree.find_methods_by_name(class, name).first() else {
        return Ok(None);
    };
    match tree.method(method).and_then(|m| m.body) {
        Some(block) => Ok(Some(block)),
        None => Err(InjectError::MissingBody {
            class: tree
                .class(class)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            method: name.to_string(),
        }),
    }
}

/// True when an expression statement of `block` mentions `line`.
pub fn contains_line(tree: &SourceTree, block: NodeId, line: &str) -> bool {
    tree.statements(block).into_iter().any(|id| {
        tree.statement(id)
            .map_or(false, |stmt| stmt.is_expression() && stmt.text.contains(line))
    })
}

fn create_method(
    tree: &mut SourceTree,
    class: NodeId,
    name: &str,
    stub: Fragment,
    changes: &mut Vec<Change>,
) {
    tree.attach(class, stub);
    changes.push(Change::MethodCreated {
        method: name.to_string(),
    });
}

fn insert_statement_before(tree: &mut SourceTree, anchor: NodeId, fragment: Fragment) -> String {
    let id = tree.build(fragment);
    tree.insert_before(anchor, id);
    statement_text(tree, id)
}

fn insert_statement_after(tree: &mut SourceTree, anchor: NodeId, fragment: Fragment) -> String {
    let id = tree.build(fragment);
    tree.insert_after(anchor, id);
    statement_text(tree, id)
}

fn statement_text(tree: &SourceTree, id: NodeId) -> String {
    tree.statement(id)
        .map(|s| s.text.clone())
        .unwrap_or_default()
}

fn skipped(method: &str, reason: SkipReason) -> Change {
    Change::Skipped {
        step: method.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injector::binding::BindingLibrary;
    use crate::source::{parse, NodeKind};

    fn butterknife() -> BindingLibrary {
        BindingLibrary::find_builtin("butterknife-7").unwrap()
    }

    fn body_texts(tree: &SourceTree, class: NodeId, method: &str) -> Vec<String> {
        let id = tree.find_methods_by_name(class, method)[0];
        let block = tree.method(id).unwrap().body.unwrap();
        tree.statements(block)
            .iter()
            .map(|s| tree.statement(*s).unwrap().text.clone())
            .collect()
    }

    fn class_of(source: &str) -> (SourceTree, NodeId) {
        let tree = parse(source).unwrap();
        let class = tree.top_level_classes()[0];
        (tree, class)
    }

    #[test]
    fn test_bind_inserted_after_set_content_view() {
        let (mut tree, class) = class_of(
            "class Main extends Activity {\n    protected void onCreate(Bundle b) {\n        super.onCreate(b);\n        setContentView(R.layout.x);\n        foo();\n    }\n}\n",
        );
        let mut changes = Vec::new();
        bind_activity(&mut tree, class, &butterknife(), &mut changes).unwrap();

        assert_eq!(
            body_texts(&tree, class, "onCreate"),
            vec![
                "super.onCreate(b);",
                "setContentView(R.layout.x);",
                "butterknife.ButterKnife.bind(this);",
                "foo();"
            ]
        );
    }

    #[test]
    fn test_activity_binding_is_idempotent() {
        let (mut tree, class) = class_of(
            "class Main extends Activity {\n    protected void onCreate(Bundle b) {\n        setContentView(R.layout.x);\n    }\n}\n",
        );
        let lib = butterknife();
        let mut changes = Vec::new();
        bind_activity(&mut tree, class, &lib, &mut changes).unwrap();
        bind_activity(&mut tree, class, &lib, &mut changes).unwrap();

        let texts = body_texts(&tree, class, "onCreate");
        assert_eq!(texts.iter().filter(|t| t.contains("ButterKnife.bind")).count(), 1);
        assert!(matches!(
            changes.last(),
            Some(Change::Skipped { reason: SkipReason::AlreadyBound, .. })
        ));
    }

    #[test]
    fn test_qualified_set_content_view_is_not_an_anchor() {
        let (mut tree, class) = class_of(
            "class Main extends Activity {\n    protected void onCreate(Bundle b) {\n        this.setContentView(R.layout.x);\n    }\n}\n",
        );
        let mut changes = Vec::new();
        bind_activity(&mut tree, class, &butterknife(), &mut changes).unwrap();

        assert_eq!(body_texts(&tree, class, "onCreate").len(), 1);
        assert_eq!(changes, vec![skipped(ON_CREATE, SkipReason::NoAnchor)]);
    }

    #[test]
    fn test_missing_on_create_gets_stub() {
        let (mut tree, class) = class_of("class Main extends Activity {\n    int a;\n}\n");
        let mut changes = Vec::new();
        bind_activity(&mut tree, class, &butterknife(), &mut changes).unwrap();

        assert_eq!(
            body_texts(&tree, class, "onCreate"),
            vec!["super.onCreate(savedInstanceState);", "butterknife.ButterKnife.bind(this);"]
        );
        assert_eq!(
            changes,
            vec![Change::MethodCreated {
                method: "onCreate".to_string()
            }]
        );
    }

    #[test]
    fn test_bodiless_lifecycle_method_is_an_error() {
        let (mut tree, class) =
            class_of("abstract class Main extends Activity {\n    abstract void onCreate(Bundle b);\n}\n");
        let err = bind_activity(&mut tree, class, &butterknife(), &mut Vec::new()).unwrap_err();
        assert_eq!(
            err,
            InjectError::MissingBody {
                class: "Main".to_string(),
                method: "onCreate".to_string()
            }
        );
    }

    #[test]
    fn test_inflated_return_is_rewritten() {
        let (mut tree, class) = class_of(
            "class Page extends Fragment {\n    public View onCreateView(LayoutInflater i, ViewGroup c, Bundle b) {\n        return i.inflate(R.layout.page, c, false);\n    }\n\n    public void onDestroyView() {\n        super.onDestroyView();\n    }\n}\n",
        );
        let mut changes = Vec::new();
        bind_fragment(&mut tree, class, &butterknife(), &mut changes).unwrap();

        let texts = body_texts(&tree, class, "onCreateView");
        assert_eq!(
            texts,
            vec![
                "android.view.View view = i.inflate(R.layout.page, c, false);",
                "butterknife.ButterKnife.bind(this, view);",
                "return view;"
            ]
        );
        assert_eq!(texts.iter().filter(|t| t.contains("i.inflate(")).count(), 1);
        assert_eq!(
            body_texts(&tree, class, "onDestroyView"),
            vec!["butterknife.ButterKnife.unbind(this);", "super.onDestroyView();"]
        );
    }

    #[test]
    fn test_plain_return_gets_bind_before_it() {
        let (mut tree, class) = class_of(
            "class Page extends Fragment {\n    public View onCreateView(LayoutInflater i, ViewGroup c, Bundle b) {\n        View root = build();\n        return root;\n    }\n}\n",
        );
        let mut changes = Vec::new();
        bind_fragment_view(&mut tree, class, &butterknife(), &mut changes).unwrap();

        assert_eq!(
            body_texts(&tree, class, "onCreateView"),
            vec!["View root = build();", "butterknife.ButterKnife.bind(this, root);", "return root;"]
        );
    }

    #[test]
    fn test_only_first_return_is_used() {
        let (mut tree, class) = class_of(
            "class Page extends Fragment {\n    public View onCreateView(LayoutInflater i, ViewGroup c, Bundle b) {\n        return first;\n        return second;\n    }\n}\n",
        );
        bind_fragment_view(&mut tree, class, &butterknife(), &mut Vec::new()).unwrap();
        assert_eq!(
            body_texts(&tree, class, "onCreateView"),
            vec!["butterknife.ButterKnife.bind(this, first);", "return first;", "return second;"]
        );
    }

    #[test]
    fn test_fragment_without_return_value_is_skipped() {
        let (mut tree, class) = class_of(
            "class Page extends Fragment {\n    public View onCreateView(LayoutInflater i, ViewGroup c, Bundle b) {\n        if (c == null) {\n            return null;\n        }\n    }\n}\n",
        );
        let mut changes = Vec::new();
        bind_fragment_view(&mut tree, class, &butterknife(), &mut changes).unwrap();
        assert_eq!(changes, vec![skipped(ON_CREATE_VIEW, SkipReason::NoAnchor)]);

        let (mut tree, class) = class_of(
            "class Page extends Fragment {\n    public View onCreateView(LayoutInflater i, ViewGroup c, Bundle b) {\n        return;\n    }\n}\n",
        );
        let mut changes = Vec::new();
        bind_fragment_view(&mut tree, class, &butterknife(), &mut changes).unwrap();
        assert_eq!(changes, vec![skipped(ON_CREATE_VIEW, SkipReason::NoReturnValue)]);
    }

    #[test]
    fn test_bound_fragment_is_left_alone() {
        let source = "class Page extends Fragment {\n    public View onCreateView(LayoutInflater i, ViewGroup c, Bundle b) {\n        View view = i.inflate(R.layout.page, c, false);\n        ButterKnife.bind(this, view);\n        return view;\n    }\n\n    public void onDestroyView() {\n        ButterKnife.unbind(this);\n        super.onDestroyView();\n    }\n}\n";
        let (mut tree, class) = class_of(source);
        let mut changes = Vec::new();
        bind_fragment(&mut tree, class, &butterknife(), &mut changes).unwrap();

        assert_eq!(
            changes,
            vec![
                skipped(ON_CREATE_VIEW, SkipReason::AlreadyBound),
                skipped(ON_DESTROY_VIEW, SkipReason::AlreadyBound),
            ]
        );
        assert_eq!(crate::source::print(&tree), source);
    }

    #[test]
    fn test_unbind_goes_before_last_statement() {
        let (mut tree, class) = class_of(
            "class Page extends Fragment {\n    public void onDestroyView() {\n        a();\n        b();\n        super.onDestroyView();\n    }\n}\n",
        );
        unbind_fragment_view(&mut tree, class, &butterknife(), &mut Vec::new()).unwrap();
        assert_eq!(
            body_texts(&tree, class, "onDestroyView"),
            vec!["a();", "b();", "butterknife.ButterKnife.unbind(this);", "super.onDestroyView();"]
        );
    }

    #[test]
    fn test_unbind_in_empty_body() {
        let (mut tree, class) =
            class_of("class Page extends Fragment {\n    public void onDestroyView() {\n    }\n}\n");
        unbind_fragment_view(&mut tree, class, &butterknife(), &mut Vec::new()).unwrap();
        assert_eq!(
            body_texts(&tree, class, "onDestroyView"),
            vec!["butterknife.ButterKnife.unbind(this);"]
        );
    }

    #[test]
    fn test_missing_fragment_methods_get_stubs() {
        let (mut tree, class) = class_of("class Page extends Fragment {\n}\n");
        let mut changes = Vec::new();
        bind_fragment(&mut tree, class, &butterknife(), &mut changes).unwrap();

        assert_eq!(tree.find_methods_by_name(class, "onCreateView").len(), 1);
        assert_eq!(tree.find_methods_by_name(class, "onDestroyView").len(), 1);
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn test_contains_line_ignores_comments_and_non_expressions() {
        let (tree, class) = class_of(
            "class Main {\n    void f() {\n        // ButterKnife.bind(this);\n        String s = \"ButterKnife.bind\";\n    }\n}\n",
        );
        let method = tree.find_methods_by_name(class, "f")[0];
        let block = tree.method(method).unwrap().body.unwrap();
        assert!(!contains_line(&tree, block, "ButterKnife.bind"));
    }

    #[test]
    fn test_fields_and_holder_are_appended() {
        let (mut tree, class) = class_of("class Adapter {\n    void f() {\n    }\n}\n");
        let lib = butterknife();
        let elements = vec![Element::new("title", "TextView", "m")];
        let mut changes = Vec::new();
        append_fields(&mut tree, class, &elements, &lib, &mut changes);
        append_holder(&mut tree, class, "ViewHolder", "row", &elements, &lib, &mut changes);

        let kinds: Vec<&NodeKind> = tree.children(class).iter().map(|c| tree.kind(*c)).collect();
        assert!(matches!(kinds[0], NodeKind::Method(_)));
        assert!(matches!(kinds[1], NodeKind::Field { .. }));
        assert!(matches!(kinds[2], NodeKind::Comment { .. }));
        assert!(matches!(kinds[3], NodeKind::Class(_)));
        assert!(tree.find_inner_class(class, "ViewHolder").is_some());
    }
}
