//! Fully-qualified names of the UI library types the schema treats specially.

pub const VIEW: &str = r#""ui/core/view".View"#;
pub const CUSTOM_LAYOUT_VIEW: &str = r#""ui/core/view".CustomLayoutView"#;
pub const BINDABLE: &str = r#""ui/core/bindable".Bindable"#;
pub const CONTENT_VIEW: &str = r#""ui/content-view".ContentView"#;
pub const LAYOUT: &str = r#""ui/layouts/layout".Layout"#;
pub const LAYOUT_BASE: &str = r#""ui/layouts/layout-base".LayoutBase"#;
pub const BORDER: &str = r#""ui/border".Border"#;
pub const FRAME: &str = r#""ui/frame".Frame"#;

pub const ACTION_BAR: &str = r#""ui/action-bar".ActionBar"#;
pub const ACTION_ITEM: &str = r#""ui/action-bar".ActionItem"#;
pub const ACTION_ITEM_BASE: &str = r#""ui/action-bar".ActionItemBase"#;

pub const DEPENDENCY_PROPERTY: &str = r#""ui/core/dependency-observable".Property"#;
pub const IMAGE_SOURCE: &str = r#""image-source".ImageSource"#;
pub const COLOR: &str = r#""color".Color"#;

pub const BINDING: &str = "Binding";
