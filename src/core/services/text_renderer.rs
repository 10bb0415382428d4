use crate::core::models::config_item::ConfigItem;

/// Render properties items as the text shown in the text diff view.
///
/// Items are sorted by key so two namespaces line up. Values have
/// literal newlines replaced by the two characters `\n`; comment-only
/// items render their comment.
pub fn render_properties(items: &[ConfigItem]) -> String {
    let mut sorted: Vec<&ConfigItem> = items.iter().collect();
    sorted.sort_by(|a, b| a.key.cmp(&b.key));

    let mut text = String::new();
    for item in sorted {
        if item.key.is_empty() {
            text.push_str(&item.comment);
        } else {
            text.push_str(&item.key);
            text.push_str(" = ");
            text.push_str(&item.value.replace('\n', "\\n"));
        }
        text.push('\n');
    }
    text
}
