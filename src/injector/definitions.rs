/// Well-known Android names used by code generation and classification
pub const ACTIVITY: &str = "android.app.Activity";
pub const FRAGMENT: &str = "android.app.Fragment";
pub const SUPPORT_FRAGMENT: &str = "android.support.v4.app.Fragment";

/// Package for widgets that are neither custom nor listed in `widget_path`
pub const DEFAULT_WIDGET_PACKAGE: &str = "android.widget.";

pub const PLATFORM_ID_PREFIX: &str = "android.R.id.";
pub const PROJECT_ID_PREFIX: &str = "R.id.";

/// Marker that makes a returned expression count as a freshly inflated layout
pub const LAYOUT_RESOURCE_MARKER: &str = "R.layout";

pub const DEFAULT_HOLDER_CLASS_NAME: &str = "ViewHolder";

/// Fully qualified names for widget types living outside `android.widget`.
pub fn widget_path(name: &str) -> Option<&'static str> {
    let path = match name {
        "View" => "android.view.View",
        "ViewGroup" => "android.view.ViewGroup",
        "ViewStub" => "android.view.ViewStub",
        "SurfaceView" => "android.view.SurfaceView",
        "TextureView" => "android.view.TextureView",
        "WebView" => "android.webkit.WebView",
        "GLSurfaceView" => "android.opengl.GLSurfaceView",
        "MediaRouteButton" => "android.app.MediaRouteButton",
        "FragmentTabHost" => "android.support.v4.app.FragmentTabHost",
        _ => return None,
    };
    Some(path)
}

/// Built-in class hierarchy: class name and its direct superclass.
pub const ANDROID_CLASSES: &[(&str, Option<&str>)] = &[
    ("java.lang.Object", None),
    ("android.content.Context", Some("java.lang.Object")),
    ("android.content.ContextWrapper", Some("android.content.Context")),
    ("android.view.ContextThemeWrapper", Some("android.content.ContextWrapper")),
    ("android.app.Activity", Some("android.view.ContextThemeWrapper")),
    ("android.app.ListActivity", Some("android.app.Activity")),
    ("android.app.ExpandableListActivity", Some("android.app.Activity")),
    ("android.preference.PreferenceActivity", Some("android.app.ListActivity")),
    ("android.support.v4.app.FragmentActivity", Some("android.app.Activity")),
    ("android.support.v7.app.ActionBarActivity", Some("android.support.v7.app.AppCompatActivity")),
    ("android.support.v7.app.AppCompatActivity", Some("android.support.v4.app.FragmentActivity")),
    ("androidx.core.app.ComponentActivity", Some("android.app.Activity")),
    ("androidx.activity.ComponentActivity", Some("androidx.core.app.ComponentActivity")),
    ("androidx.fragment.app.FragmentActivity", Some("androidx.activity.ComponentActivity")),
    ("androidx.appcompat.app.AppCompatActivity", Some("androidx.fragment.app.FragmentActivity")),
    ("android.app.Fragment", Some("java.lang.Object")),
    ("android.app.DialogFragment", Some("android.app.Fragment")),
    ("android.app.ListFragment", Some("android.app.Fragment")),
    ("android.preference.PreferenceFragment", Some("android.app.Fragment")),
    ("android.support.v4.app.Fragment", Some("java.lang.Object")),
    ("android.support.v4.app.DialogFragment", Some("android.support.v4.app.Fragment")),
    ("android.support.v4.app.ListFragment", Some("android.support.v4.app.Fragment")),
    ("android.support.v7.app.AppCompatDialogFragment", Some("android.support.v4.app.DialogFragment")),
    ("android.view.View", Some("java.lang.Object")),
    ("android.view.ViewGroup", Some("android.view.View")),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_path_lookup() {
        assert_eq!(widget_path("WebView"), Some("android.webkit.WebView"));
        assert_eq!(widget_path("Button"), None);
    }

    #[test]
    fn test_every_superclass_is_defined() {
        for (name, parent) in ANDROID_CLASSES {
            if let Some(parent) = parent {
                assert!(
                    ANDROID_CLASSES.iter().any(|(n, _)| n == parent),
                    "{} extends undefined {}",
                    name,
                    parent
                );
            }
        }
    }
}
