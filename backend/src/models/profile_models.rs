use serde::{Deserialize, Serialize};
use std::fmt;

pub const BIO_MAX_CHARS: usize = 250;
pub const DEMO_MEMBER_ID: &str = "M123456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
}

impl Location {
    pub fn new(city: &str, state: &str, country: &str) -> Self {
        Self {
            city: city.to_string(),
            state: state.to_string(),
            country: country.to_string(),
        }
    }

    /// Parts in city, state, country order, skipping whitespace-only ones.
    /// Kept parts are not trimmed.
    pub fn parts(&self) -> Vec<&str> {
        [self.city.as_str(), self.state.as_str(), self.country.as_str()]
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect()
    }

    /// The free-text query sent to the geocoder, also used as display text.
    pub fn label(&self) -> String {
        self.parts().join(", ")
    }

    pub fn is_blank(&self) -> bool {
        self.parts().is_empty()
    }

    /// Link handed to the map view. Always carries all three parameters.
    pub fn map_path(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("city", &self.city)
            .append_pair("state", &self.state)
            .append_pair("country", &self.country)
            .finish();
        format!("/map?{}", query)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub member_id: String,
    pub name: String,
    pub nickname: String,
    pub avatar: String, // path or data URL
    pub email: String,
    pub visibility: Visibility,
    pub location: Location,
    pub subscription_plan: String, // display only, changed through billing
    pub bio: String,
}

impl Profile {
    pub fn demo() -> Self {
        Self {
            member_id: DEMO_MEMBER_ID.to_string(),
            name: "John Doe".to_string(),
            nickname: "Johnny".to_string(),
            avatar: "/default-avatar.png".to_string(),
            email: "john.doe@example.com".to_string(),
            visibility: Visibility::Public,
            location: Location::new("New York", "NY", "USA"),
            subscription_plan: "Free".to_string(),
            bio: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Profile,
    Account,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tab::Profile => write!(f, "profile"),
            Tab::Account => write!(f, "account"),
        }
    }
}

/// Which tab, if any, currently has its form unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveEdit {
    #[default]
    None,
    Profile,
    Account,
}

impl ActiveEdit {
    pub fn tab(&self) -> Option<Tab> {
        match self {
            ActiveEdit::None => None,
            ActiveEdit::Profile => Some(Tab::Profile),
            ActiveEdit::Account => Some(Tab::Account),
        }
    }
}

impl From<Tab> for ActiveEdit {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::Profile => ActiveEdit::Profile,
            Tab::Account => ActiveEdit::Account,
        }
    }
}

/// Addressable profile fields. Nested location fields use dotted paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Nickname,
    Bio,
    Visibility,
    City,
    State,
    Country,
    Email,
    MemberId,
    SubscriptionPlan,
}

impl ProfileField {
    pub fn from_path(path: &str) -> Option<Self> {
        let field = match path {
            "name" => ProfileField::Name,
            "nickname" => ProfileField::Nickname,
            "bio" => ProfileField::Bio,
            "visibility" => ProfileField::Visibility,
            "location.city" => ProfileField::City,
            "location.state" => ProfileField::State,
            "location.country" => ProfileField::Country,
            "email" => ProfileField::Email,
            "memberId" | "member_id" => ProfileField::MemberId,
            "subscriptionPlan" | "subscription_plan" => ProfileField::SubscriptionPlan,
            _ => return None,
        };
        Some(field)
    }

    pub fn path(&self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Nickname => "nickname",
            ProfileField::Bio => "bio",
            ProfileField::Visibility => "visibility",
            ProfileField::City => "location.city",
            ProfileField::State => "location.state",
            ProfileField::Country => "location.country",
            ProfileField::Email => "email",
            ProfileField::MemberId => "memberId",
            ProfileField::SubscriptionPlan => "subscriptionPlan",
        }
    }

    pub fn tab(&self) -> Tab {
        match self {
            ProfileField::Email | ProfileField::MemberId | ProfileField::SubscriptionPlan => {
                Tab::Account
            }
            _ => Tab::Profile,
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, ProfileField::MemberId | ProfileField::SubscriptionPlan)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

pub const COUNTRIES: &[(&str, &str)] = &[
    ("USA", "United States"),
    ("CAN", "Canada"),
    ("FRA", "France"),
    ("JPN", "Japan"),
    ("SGP", "Singapore"),
    ("AUS", "Australia"),
    ("DEU", "Germany"),
];

pub fn country_options() -> Vec<SelectOption> {
    COUNTRIES
        .iter()
        .map(|(value, label)| SelectOption {
            value: value.to_string(),
            label: label.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "options", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Textarea,
    Select(Vec<SelectOption>),
    Radio(Vec<SelectOption>),
}

#[derive(Debug, Clone, Serialize)]
pub struct FormFieldDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub value: String,
    pub kind: FieldKind,
    pub required: bool,
    pub disabled: bool,
    pub placeholder: Option<&'static str>,
}
