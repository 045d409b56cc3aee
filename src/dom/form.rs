//! Form controls and their serialization.

use std::path::PathBuf;

use crate::types::FormData;

/// What kind of control a form field is. Decides how it serializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `<input>` of a text-like type.
    Text,
    TextArea,
    Select,
    /// Checkbox or radio: submitted only while checked.
    Checkable,
    /// File picker: submitted only with a selection.
    File,
    /// Submit, reset and plain buttons are never submitted.
    Button,
}

impl FieldKind {
    pub(crate) fn from_input_type(ty: Option<&str>) -> Self {
        match ty.map(str::to_ascii_lowercase).as_deref() {
            Some("checkbox" | "radio") => Self::Checkable,
            Some("file") => Self::File,
            Some("submit" | "reset" | "button" | "image") => Self::Button,
            _ => Self::Text,
        }
    }
}

/// A named control inside a `<form>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    name: String,
    kind: FieldKind,
    value: String,
    default_value: String,
    checked: bool,
    default_checked: bool,
    file: Option<PathBuf>,
}

impl FormField {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            value: String::new(),
            default_value: String::new(),
            checked: false,
            default_checked: false,
            file: None,
        }
    }

    /// Set the value the field starts with and returns to on reset.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.value.clone_from(&value);
        self.default_value = value;
        self
    }

    #[must_use]
    pub fn with_default_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self.default_checked = checked;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn file(&self) -> Option<&PathBuf> {
        self.file.as_ref()
    }

    pub(crate) fn set_default(&mut self, value: String) {
        self.value.clone_from(&value);
        self.default_value = value;
    }

    pub(crate) fn push_default_text(&mut self, text: &str) {
        self.value.push_str(text);
        self.default_value.push_str(text);
    }

    fn reset(&mut self) {
        self.value.clone_from(&self.default_value);
        self.checked = self.default_checked;
        self.file = None;
    }
}

/// The controls of one `<form>` element, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<FormField>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn push(&mut self, field: FormField) {
        self.fields.push(field);
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn last_field_mut(&mut self) -> Option<&mut FormField> {
        self.fields.last_mut()
    }

    /// Type into the first non-file field named `name`.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        let Some(field) = self
            .fields
            .iter_mut()
            .find(|f| f.name == name && f.kind != FieldKind::File)
        else {
            return false;
        };
        field.value = value.into();
        if field.kind == FieldKind::Checkable {
            field.checked = true;
        }
        true
    }

    pub fn set_checked(&mut self, name: &str, checked: bool) -> bool {
        let Some(field) = self
            .fields
            .iter_mut()
            .find(|f| f.name == name && f.kind == FieldKind::Checkable)
        else {
            return false;
        };
        field.checked = checked;
        true
    }

    /// Select a file for the file input named `name`.
    pub fn attach(&mut self, name: &str, path: impl Into<PathBuf>) -> bool {
        let Some(field) = self
            .fields
            .iter_mut()
            .find(|f| f.name == name && f.kind == FieldKind::File)
        else {
            return false;
        };
        field.file = Some(path.into());
        true
    }

    /// Return every control to its default value.
    pub fn reset(&mut self) {
        self.fields.iter_mut().for_each(FormField::reset);
    }

    /// Whether every control currently holds its default value.
    pub fn is_pristine(&self) -> bool {
        self.fields.iter().all(|f| {
            f.value == f.default_value && f.checked == f.default_checked && f.file.is_none()
        })
    }

    /// Serialize the controls the way a browser builds `FormData`.
    pub fn form_data(&self) -> FormData {
        let mut data = FormData::new();
        for field in &self.fields {
            match field.kind {
                FieldKind::Text | FieldKind::TextArea | FieldKind::Select => {
                    data.append(&field.name, &field.value);
                }
                FieldKind::Checkable if field.checked => {
                    data.append(&field.name, &field.value);
                }
                FieldKind::File => {
                    if let Some(path) = &field.file {
                        data.append_file(&field.name, path.clone());
                    }
                }
                FieldKind::Checkable | FieldKind::Button => {}
            }
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FormEntry;

    fn reply_form() -> Form {
        Form::new()
            .with_field(FormField::new("reply_title", FieldKind::Text))
            .with_field(FormField::new("reply_content", FieldKind::TextArea))
            .with_field(FormField::new("notify", FieldKind::Checkable).with_default("on"))
            .with_field(FormField::new("file", FieldKind::File))
            .with_field(FormField::new("send", FieldKind::Button).with_default("Send"))
    }

    #[test]
    fn reset_restores_defaults_and_drops_files() {
        let mut form = reply_form();
        form.set_value("reply_title", "Thanks");
        form.set_checked("notify", true);
        form.attach("file", "/tmp/log.txt");
        assert!(!form.is_pristine());

        form.reset();
        assert!(form.is_pristine());
        assert_eq!(form.field("reply_title").unwrap().value(), "");
        assert!(form.field("file").unwrap().file().is_none());
    }

    #[test]
    fn form_data_skips_buttons_unchecked_boxes_and_empty_files() {
        let mut form = reply_form();
        form.set_value("reply_title", "Hi");
        let data = form.form_data();
        let names: Vec<_> = data.entries().iter().map(FormEntry::name).collect();
        assert_eq!(names, ["reply_title", "reply_content"]);

        form.set_checked("notify", true);
        form.attach("file", "a.png");
        let names: Vec<_> = form
            .form_data()
            .entries()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, ["reply_title", "reply_content", "notify", "file"]);
    }

    #[test]
    fn attach_only_targets_file_inputs() {
        let mut form = reply_form();
        assert!(!form.attach("reply_title", "x"));
        assert!(!form.set_value("file", "x"));
    }
}
