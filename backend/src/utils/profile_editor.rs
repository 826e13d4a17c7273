use serde::Serialize;
use thiserror::Error;

use crate::models::profile_models::{
    country_options, ActiveEdit, FieldKind, FormFieldDescriptor, Profile, ProfileField,
    SelectOption, Tab, Visibility, BIO_MAX_CHARS,
};
use crate::utils::validation::is_valid_email;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("{0}")]
    Validation(String),
    #[error("The {0} tab is not in edit mode")]
    NotEditing(Tab),
    #[error("Finish editing the {0} tab first")]
    EditInProgress(Tab),
    #[error("Field {0} is read-only")]
    ReadOnlyField(&'static str),
    #[error("Unknown field {0}")]
    UnknownField(String),
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("Avatar upload is still in progress")]
    AvatarReadPending,
}

/// Handed out when an avatar read starts; only the newest ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvatarTicket(u64);

#[derive(Debug, Clone, Serialize)]
pub struct EditorView {
    pub profile: Profile,
    pub active_tab: Tab,
    pub active_edit: ActiveEdit,
    pub avatar_preview: String,
    pub avatar_pending: bool,
    pub error: Option<String>,
    pub location_label: String,
    pub map_link: String,
    pub upgrade_url: &'static str,
}

/// Per-member profile editing state.
///
/// Committed values live in `profile`. Entering edit mode copies them into a
/// draft which field updates mutate; submit promotes the draft, cancel drops it.
#[derive(Debug, Clone)]
pub struct ProfileEditor {
    profile: Profile,
    draft: Option<Profile>,
    active_tab: Tab,
    active_edit: ActiveEdit,
    avatar_preview: String,
    error: Option<String>,
    avatar_generation: u64,
    pending_avatar: Option<u64>,
}

impl ProfileEditor {
    pub fn new(profile: Profile) -> Self {
        let avatar_preview = profile.avatar.clone();
        Self {
            profile,
            draft: None,
            active_tab: Tab::Profile,
            active_edit: ActiveEdit::None,
            avatar_preview,
            error: None,
            avatar_generation: 0,
            pending_avatar: None,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Draft while editing, committed profile otherwise.
    pub fn current(&self) -> &Profile {
        self.draft.as_ref().unwrap_or(&self.profile)
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn active_edit(&self) -> ActiveEdit {
        self.active_edit
    }

    pub fn avatar_preview(&self) -> &str {
        &self.avatar_preview
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn avatar_pending(&self) -> bool {
        self.pending_avatar.is_some()
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn start_edit(&mut self, tab: Tab) -> Result<(), EditorError> {
        match self.active_edit.tab() {
            Some(current) if current == tab => return Ok(()),
            Some(current) => return Err(EditorError::EditInProgress(current)),
            None => {}
        }
        self.active_edit = tab.into();
        self.active_tab = tab;
        self.draft = Some(self.profile.clone());
        self.error = None;
        Ok(())
    }

    pub fn update_field(&mut self, path: &str, value: &str) -> Result<(), EditorError> {
        let field = ProfileField::from_path(path)
            .ok_or_else(|| EditorError::UnknownField(path.to_string()))?;
        if field.is_read_only() {
            return Err(EditorError::ReadOnlyField(field.path()));
        }
        if self.active_edit.tab() != Some(field.tab()) {
            return Err(EditorError::NotEditing(field.tab()));
        }
        let draft = self
            .draft
            .as_mut()
            .ok_or(EditorError::NotEditing(field.tab()))?;

        match field {
            ProfileField::Name => draft.name = value.to_string(),
            ProfileField::Nickname => draft.nickname = value.to_string(),
            ProfileField::Bio => draft.bio = value.to_string(),
            ProfileField::City => draft.location.city = value.to_string(),
            ProfileField::State => draft.location.state = value.to_string(),
            ProfileField::Country => draft.location.country = value.to_string(),
            ProfileField::Email => draft.email = value.trim().to_string(),
            ProfileField::Visibility => {
                draft.visibility =
                    Visibility::parse(value).ok_or_else(|| EditorError::InvalidValue {
                        field: field.path(),
                        value: value.to_string(),
                    })?;
            }
            ProfileField::MemberId | ProfileField::SubscriptionPlan => {
                return Err(EditorError::ReadOnlyField(field.path()));
            }
        }
        self.error = None;
        Ok(())
    }

    /// Commits the profile draft together with the avatar preview.
    pub fn submit_profile(&mut self) -> Result<Profile, EditorError> {
        if self.active_edit != ActiveEdit::Profile {
            return Err(EditorError::NotEditing(Tab::Profile));
        }
        if self.pending_avatar.is_some() {
            return Err(self.fail(EditorError::AvatarReadPending));
        }
        let draft = self
            .draft
            .take()
            .ok_or(EditorError::NotEditing(Tab::Profile))?;
        if let Err(e) = validate_profile(&draft) {
            self.draft = Some(draft);
            return Err(self.fail(e));
        }

        let mut committed = draft;
        committed.avatar = self.avatar_preview.clone();
        self.profile = committed.clone();
        self.active_edit = ActiveEdit::None;
        self.error = None;
        Ok(committed)
    }

    pub fn submit_account(&mut self) -> Result<Profile, EditorError> {
        if self.active_edit != ActiveEdit::Account {
            return Err(EditorError::NotEditing(Tab::Account));
        }
        let draft = self
            .draft
            .take()
            .ok_or(EditorError::NotEditing(Tab::Account))?;
        if !is_valid_email(&draft.email) {
            self.draft = Some(draft);
            return Err(self.fail(EditorError::Validation("Invalid email format".to_string())));
        }

        self.profile = draft;
        self.active_edit = ActiveEdit::None;
        self.error = None;
        Ok(self.profile.clone())
    }

    pub fn cancel_edit(&mut self) {
        self.active_edit = ActiveEdit::None;
        self.draft = None;
        self.avatar_preview = self.profile.avatar.clone();
        self.error = None;
        // Reads still in flight belong to the discarded edit.
        self.pending_avatar = None;
        self.avatar_generation += 1;
    }

    /// Puts back `previous` after a failed save and reopens `tab` with the
    /// values the member tried to save.
    pub fn rollback_commit(&mut self, tab: Tab, previous: Profile, attempted: Profile, message: &str) {
        self.avatar_preview = attempted.avatar.clone();
        self.profile = previous;
        self.draft = Some(attempted);
        self.active_edit = tab.into();
        self.active_tab = tab;
        self.error = Some(message.to_string());
    }

    pub fn begin_avatar_read(&mut self) -> Result<AvatarTicket, EditorError> {
        if self.active_edit != ActiveEdit::Profile {
            return Err(EditorError::NotEditing(Tab::Profile));
        }
        self.avatar_generation += 1;
        self.pending_avatar = Some(self.avatar_generation);
        Ok(AvatarTicket(self.avatar_generation))
    }

    /// Returns false when the ticket was superseded and the data was dropped.
    pub fn complete_avatar_read(&mut self, ticket: AvatarTicket, data_url: String) -> bool {
        if self.pending_avatar != Some(ticket.0) {
            return false;
        }
        self.pending_avatar = None;
        self.avatar_preview = data_url;
        true
    }

    pub fn fail_avatar_read(&mut self, ticket: AvatarTicket, message: &str) -> bool {
        if self.pending_avatar != Some(ticket.0) {
            return false;
        }
        self.pending_avatar = None;
        self.error = Some(message.to_string());
        true
    }

    pub fn view(&self) -> EditorView {
        let profile = self.current().clone();
        let location_label = profile.location.label();
        let map_link = profile.location.map_path();
        EditorView {
            profile,
            active_tab: self.active_tab,
            active_edit: self.active_edit,
            avatar_preview: self.avatar_preview.clone(),
            avatar_pending: self.avatar_pending(),
            error: self.error.clone(),
            location_label,
            map_link,
            upgrade_url: "/pricing",
        }
    }

    pub fn form(&self, tab: Tab) -> Vec<FormFieldDescriptor> {
        let current = self.current();
        let locked = self.active_edit.tab() != Some(tab);
        match tab {
            Tab::Profile => vec![
                text_field("name", "Name", &current.name, locked, true, None),
                text_field("nickname", "Nickname", &current.nickname, locked, false, None),
                FormFieldDescriptor {
                    kind: FieldKind::Textarea,
                    ..text_field("bio", "Bio", &current.bio, locked, false, None)
                },
                text_field(
                    "location.city",
                    "City",
                    &current.location.city,
                    locked,
                    false,
                    Some("e.g., Tokyo, Paris"),
                ),
                text_field(
                    "location.state",
                    "State/Province/Region (Optional)",
                    &current.location.state,
                    locked,
                    false,
                    Some("e.g., NY, Ontario, or leave blank"),
                ),
                FormFieldDescriptor {
                    kind: FieldKind::Select(country_options()),
                    ..text_field(
                        "location.country",
                        "Country",
                        &current.location.country,
                        locked,
                        true,
                        Some("Select a country"),
                    )
                },
                FormFieldDescriptor {
                    kind: FieldKind::Radio(visibility_options()),
                    ..text_field(
                        "visibility",
                        "Profile Visibility",
                        current.visibility.as_str(),
                        locked,
                        false,
                        None,
                    )
                },
            ],
            Tab::Account => vec![
                text_field("memberId", "Member ID", &current.member_id, true, false, None),
                FormFieldDescriptor {
                    kind: FieldKind::Email,
                    ..text_field("email", "Email", &current.email, locked, true, None)
                },
                text_field(
                    "subscriptionPlan",
                    "Subscription Plan",
                    &current.subscription_plan,
                    true,
                    false,
                    None,
                ),
            ],
        }
    }

    fn fail(&mut self, error: EditorError) -> EditorError {
        self.error = Some(error.to_string());
        error
    }
}

fn validate_profile(profile: &Profile) -> Result<(), EditorError> {
    if profile.location.country.trim().is_empty() {
        return Err(EditorError::Validation("Country is required".to_string()));
    }
    if profile.bio.chars().count() > BIO_MAX_CHARS {
        return Err(EditorError::Validation(format!(
            "Bio must be {} characters or fewer",
            BIO_MAX_CHARS
        )));
    }
    Ok(())
}

fn text_field(
    id: &'static str,
    label: &'static str,
    value: &str,
    disabled: bool,
    required: bool,
    placeholder: Option<&'static str>,
) -> FormFieldDescriptor {
    FormFieldDescriptor {
        id,
        label,
        value: value.to_string(),
        kind: FieldKind::Text,
        required,
        disabled,
        placeholder,
    }
}

fn visibility_options() -> Vec<SelectOption> {
    [Visibility::Public, Visibility::Private]
        .iter()
        .map(|v| SelectOption {
            value: v.as_str().to_string(),
            label: v.as_str().to_string(),
        })
        .collect()
}
