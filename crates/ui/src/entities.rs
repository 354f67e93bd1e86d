//! # Entity Catalogue
//!
//! The record types the tracker manages and the forms, detail views and
//! tabs each one opens with. Layouts are rebuilt from the record cache on
//! every render so lookup selects pick up freshly loaded options; a lookup
//! select stays disabled while its source list is loading or empty.

use jobtrack_client::{Backend, FileFieldMapping};
use jobtrack_core::value::value_to_text;
use jobtrack_core::{FieldErrors, FormData, RecordId, Submode, is_missing};
use jobtrack_engine::{FormScope, SubmitStrategy};
use jobtrack_schema::{
    EntityValidator, FieldCheck, FieldDescriptor, FieldGroup, FieldValidator, Rule, SelectOption,
    TableColumn,
};
use serde_json::Value;
use std::rc::Rc;

use crate::state::RecordCache;

/// Render slot of the application status picker
pub const STATUS_PICKER_SLOT: &str = "status_picker";

/// Content slot listing the contacts of a company
pub const COMPANY_CONTACTS_SLOT: &str = "company_contacts";

/// Content slot listing the interviews of an application
pub const APPLICATION_INTERVIEWS_SLOT: &str = "application_interviews";

/// Read-only attributes the backend adds to records
const SERVER_FIELDS: [&str; 3] = ["created_at", "updated_at", "company_name"];

// ============================================================================
// EntityKind
// ============================================================================

/// Record types managed by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Application,
    Company,
    Contact,
    Location,
    Interview,
}

impl EntityKind {
    /// All record types
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Application,
        EntityKind::Company,
        EntityKind::Contact,
        EntityKind::Location,
        EntityKind::Interview,
    ];

    /// Backend endpoint
    pub fn endpoint(&self) -> &'static str {
        match self {
            EntityKind::Application => "applications",
            EntityKind::Company => "companies",
            EntityKind::Contact => "contacts",
            EntityKind::Location => "locations",
            EntityKind::Interview => "interviews",
        }
    }

    /// Record type served by an endpoint
    pub fn from_endpoint(endpoint: &str) -> Option<Self> {
        let endpoint = endpoint.trim_matches('/');
        Self::ALL.into_iter().find(|k| k.endpoint() == endpoint)
    }

    /// Singular label
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Application => "Application",
            EntityKind::Company => "Company",
            EntityKind::Contact => "Contact",
            EntityKind::Location => "Location",
            EntityKind::Interview => "Interview",
        }
    }

    /// Plural label
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Application => "Applications",
            EntityKind::Company => "Companies",
            EntityKind::Contact => "Contacts",
            EntityKind::Location => "Locations",
            EntityKind::Interview => "Interviews",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            EntityKind::Application => "📨",
            EntityKind::Company => "🏢",
            EntityKind::Contact => "👤",
            EntityKind::Location => "📍",
            EntityKind::Interview => "🗓️",
        }
    }

    /// Columns of the list page: attribute name and header
    pub fn columns(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            EntityKind::Application => &[
                ("role", "Role"),
                ("company", "Company"),
                ("status", "Status"),
                ("applied_at", "Applied"),
            ],
            EntityKind::Company => &[
                ("name", "Name"),
                ("industry", "Industry"),
                ("website", "Website"),
            ],
            EntityKind::Contact => &[
                ("first_name", "First name"),
                ("last_name", "Last name"),
                ("email", "Email"),
                ("company", "Company"),
            ],
            EntityKind::Location => &[
                ("city", "City"),
                ("country", "Country"),
                ("remote", "Remote"),
            ],
            EntityKind::Interview => &[
                ("scheduled_at", "Scheduled"),
                ("format", "Format"),
                ("application", "Application"),
            ],
        }
    }

    /// Short human title of a record
    pub fn title(&self, data: &FormData) -> String {
        let text = |key: &str| value_to_text(data.get(key)).trim().to_string();
        let title = match self {
            EntityKind::Application => text("role"),
            EntityKind::Company => text("name"),
            EntityKind::Contact => format!("{} {}", text("first_name"), text("last_name"))
                .trim()
                .to_string(),
            EntityKind::Location => [text("city"), text("country")]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            EntityKind::Interview => match text("scheduled_at") {
                s if s.is_empty() => String::new(),
                s => format!("Interview {}", s.replace('T', " ")),
            },
        };

        if !title.is_empty() {
            return title;
        }
        match RecordId::of(data) {
            Some(id) => format!("{} #{}", self.label(), id),
            None => format!("New {}", self.label().to_lowercase()),
        }
    }

    /// Record types whose lists feed this type's selects
    pub fn lookups(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::Application => &[EntityKind::Company, EntityKind::Interview],
            EntityKind::Company => &[EntityKind::Location, EntityKind::Contact],
            EntityKind::Contact => &[EntityKind::Company],
            EntityKind::Location => &[],
            EntityKind::Interview => &[EntityKind::Application, EntityKind::Contact],
        }
    }

    // ========================================================================
    // Layouts
    // ========================================================================

    /// Layout of the editable form
    pub fn form(&self, cache: &RecordCache) -> Vec<FieldGroup> {
        match self {
            EntityKind::Application => application_form(cache),
            EntityKind::Company => company_form(cache),
            EntityKind::Contact => contact_form(cache),
            EntityKind::Location => location_form(),
            EntityKind::Interview => interview_form(cache),
        }
    }

    /// Layout of the detail view
    pub fn view(&self, cache: &RecordCache) -> Vec<FieldGroup> {
        let mut groups = self.form(cache);
        match self {
            EntityKind::Application => {
                groups.push(FieldGroup::custom(APPLICATION_INTERVIEWS_SLOT));
            }
            EntityKind::Company => groups.push(FieldGroup::custom(COMPANY_CONTACTS_SLOT)),
            _ => {}
        }
        groups
    }

    /// Configured scope for one record
    pub fn scope(
        &self,
        data: FormData,
        submode: Submode,
        cache: &RecordCache,
        backend: &Rc<dyn Backend>,
    ) -> FormScope {
        let scope = FormScope::new(self.endpoint(), self.endpoint())
            .with_label(self.label())
            .with_data(data)
            .with_submode(submode)
            .with_form(self.form(cache))
            .with_view(self.view(cache))
            .with_transform(strip_server_fields);

        match self {
            EntityKind::Application => scope
                .with_validator(application_validator())
                .with_strategy(SubmitStrategy::with_file_fields(vec![
                    FileFieldMapping::same("cv"),
                    FileFieldMapping::same("cover_letter"),
                ])),
            EntityKind::Company => scope.with_validator(unique_company_name(backend.clone())),
            EntityKind::Contact => scope.with_transform(|data| trim_names(strip_server_fields(data))),
            EntityKind::Location | EntityKind::Interview => scope,
        }
    }

    /// All tabs of the modal for one record.
    ///
    /// A company that already exists gets a second tab adding a contact
    /// to it.
    pub fn scopes(
        &self,
        record: Option<FormData>,
        submode: Submode,
        cache: &RecordCache,
        backend: &Rc<dyn Backend>,
    ) -> Vec<FormScope> {
        let data = record.unwrap_or_default();
        let id = RecordId::of(&data);
        let mut scopes = vec![self.scope(data, submode, cache, backend)];

        if let (EntityKind::Company, Some(id), Submode::View) = (self, id, submode) {
            let mut contact = FormData::new();
            contact.insert("company".to_string(), id.to_value());
            scopes.push(
                EntityKind::Contact
                    .scope(contact, Submode::Add, cache, backend)
                    .with_label("Add contact"),
            );
        }
        scopes
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Lookups
// ============================================================================

/// Select options built from the cached records of a type
pub fn lookup_options(kind: EntityKind, cache: &RecordCache) -> Vec<SelectOption> {
    cache
        .records(kind)
        .iter()
        .filter_map(|record| {
            let data = record.as_object()?;
            let id = RecordId::of(data)?;
            Some(SelectOption::new(id.to_value(), kind.title(data)))
        })
        .collect()
}

fn lookup_field(
    field: FieldDescriptor,
    source: EntityKind,
    cache: &RecordCache,
) -> FieldDescriptor {
    let options = lookup_options(source, cache);
    if cache.is_loading(source) {
        return field.disabled().with_placeholder("Loading…");
    }
    if options.is_empty() {
        return field
            .disabled()
            .with_placeholder(format!("No {} yet", source.plural().to_lowercase()));
    }
    field.with_options(options)
}

fn plain_options(values: &[&str]) -> Vec<SelectOption> {
    values.iter().map(|v| SelectOption::plain(*v)).collect()
}

// ============================================================================
// Forms
// ============================================================================

fn application_form(cache: &RecordCache) -> Vec<FieldGroup> {
    let statuses = vec![
        SelectOption::new("applied", "Applied"),
        SelectOption::new("interviewing", "Interviewing"),
        SelectOption::new("offer", "Offer"),
        SelectOption::new("rejected", "Rejected"),
        SelectOption::new("withdrawn", "Withdrawn"),
    ];
    let tags = vec![
        SelectOption::new("remote", "Remote"),
        SelectOption::new("hybrid", "Hybrid"),
        SelectOption::new("on_site", "On site"),
        SelectOption::new("full_time", "Full time"),
        SelectOption::new("contract", "Contract"),
    ];
    let documents = ["pdf", "doc", "docx", "odt"];

    vec![
        FieldGroup::row([
            FieldDescriptor::text("role", "Role")
                .required()
                .with_placeholder("Backend Engineer")
                .with_rule(Rule::MaxLength(200)),
            lookup_field(
                FieldDescriptor::select("company", "Company", Vec::new()).required(),
                EntityKind::Company,
                cache,
            ),
        ]),
        FieldGroup::row([
            FieldDescriptor::select("status", "Status", statuses)
                .required()
                .with_default("applied")
                .with_render(STATUS_PICKER_SLOT),
            FieldDescriptor::datetime("applied_at", "Applied"),
        ]),
        FieldGroup::row([
            FieldDescriptor::salary("salary", "Salary"),
            FieldDescriptor::rating("interest", "Interest"),
        ]),
        FieldDescriptor::multiselect("tags", "Tags", tags).into(),
        FieldDescriptor::url("posting_url", "Job posting")
            .with_placeholder("https://")
            .into(),
        FieldGroup::row([
            FieldDescriptor::file("cv", "CV", &documents),
            FieldDescriptor::file("cover_letter", "Cover letter", &documents),
        ]),
        FieldDescriptor::textarea("notes", "Notes").with_rows(6).into(),
    ]
}

fn company_form(cache: &RecordCache) -> Vec<FieldGroup> {
    let industries = plain_options(&[
        "Software",
        "Finance",
        "Healthcare",
        "Education",
        "Retail",
        "Manufacturing",
        "Public sector",
        "Other",
    ]);

    vec![
        FieldDescriptor::text("name", "Name")
            .required()
            .with_rule(Rule::MaxLength(120))
            .into(),
        FieldGroup::row([
            FieldDescriptor::url("website", "Website").with_placeholder("https://"),
            FieldDescriptor::select("industry", "Industry", industries),
        ]),
        lookup_field(
            FieldDescriptor::select("location", "Location", Vec::new()),
            EntityKind::Location,
            cache,
        )
        .into(),
        FieldDescriptor::rating("rating", "Rating").into(),
        FieldDescriptor::textarea("notes", "Notes").into(),
    ]
}

fn contact_form(cache: &RecordCache) -> Vec<FieldGroup> {
    vec![
        FieldGroup::row([
            FieldDescriptor::text("first_name", "First name").required(),
            FieldDescriptor::text("last_name", "Last name"),
        ]),
        FieldGroup::row([
            FieldDescriptor::email("email", "Email").required(),
            FieldDescriptor::tel("phone", "Phone"),
        ]),
        FieldGroup::row([
            lookup_field(
                FieldDescriptor::select("company", "Company", Vec::new()),
                EntityKind::Company,
                cache,
            ),
            FieldDescriptor::text("position", "Position"),
        ]),
        FieldDescriptor::url("linkedin", "LinkedIn")
            .with_help("Profile URL")
            .into(),
        FieldDescriptor::textarea("notes", "Notes").with_rows(3).into(),
    ]
}

fn location_form() -> Vec<FieldGroup> {
    vec![
        FieldGroup::row([
            FieldDescriptor::text("city", "City").required(),
            FieldDescriptor::text("country", "Country").required(),
        ]),
        FieldDescriptor::text("address", "Address").into(),
        FieldDescriptor::checkbox("remote", "Remote friendly").into(),
    ]
}

fn interview_form(cache: &RecordCache) -> Vec<FieldGroup> {
    let formats = vec![
        SelectOption::new("phone", "Phone"),
        SelectOption::new("video", "Video call"),
        SelectOption::new("on_site", "On site"),
        SelectOption::new("take_home", "Take-home task"),
    ];

    vec![
        lookup_field(
            FieldDescriptor::select("application", "Application", Vec::new()).required(),
            EntityKind::Application,
            cache,
        )
        .into(),
        FieldGroup::row([
            FieldDescriptor::datetime("scheduled_at", "Scheduled").required(),
            FieldDescriptor::select("format", "Format", formats).with_default("video"),
        ]),
        lookup_field(
            FieldDescriptor::multiselect("interviewers", "Interviewers", Vec::new()),
            EntityKind::Contact,
            cache,
        )
        .into(),
        FieldGroup::row([
            FieldDescriptor::url("meeting_url", "Meeting link"),
            FieldDescriptor::password("meeting_passcode", "Passcode"),
        ]),
        FieldDescriptor::table(
            "questions",
            "Questions",
            vec![
                TableColumn::new("question", "Question"),
                TableColumn::new("answer", "My answer"),
            ],
        )
        .into(),
        FieldGroup::row([
            FieldDescriptor::rating("rating", "How it went"),
            FieldDescriptor::checkbox("follow_up_sent", "Follow-up sent"),
        ]),
        FieldDescriptor::textarea("notes", "Notes").into(),
    ]
}

// ============================================================================
// Validators & transforms
// ============================================================================

fn application_validator() -> EntityValidator {
    EntityValidator::sync(|data| {
        let mut errors = FieldErrors::new();
        let salary = data.get("salary");
        let bound = |key: &str| salary.and_then(|s| s.get(key)).and_then(Value::as_f64);

        if let (Some(min), Some(max)) = (bound("min"), bound("max"))
            && min > max
        {
            errors.insert("salary", "Minimum salary cannot exceed the maximum");
        }
        let is_offer = data.get("status").and_then(Value::as_str) == Some("offer");
        if is_offer && bound("min").is_none() && bound("max").is_none() {
            errors.append("salary", "An offer needs a salary");
        }
        errors
    })
}

/// Company names must be unique; the lookup skips the record itself
fn unique_company_name(backend: Rc<dyn Backend>) -> EntityValidator {
    EntityValidator::per_field([(
        "name",
        FieldValidator::from_async(move |value, data| {
            let backend = backend.clone();
            async move {
                let name = value_to_text(Some(&value)).trim().to_string();
                if name.is_empty() {
                    return FieldCheck::valid();
                }
                let own_id = RecordId::of(&data);
                match backend
                    .list(EntityKind::Company.endpoint(), &[("name", name.as_str())])
                    .await
                {
                    Ok(matches) => {
                        let taken = matches
                            .iter()
                            .any(|m| m.get("id").and_then(RecordId::from_value) != own_id);
                        if taken {
                            FieldCheck::invalid(format!("A company named \"{}\" already exists", name))
                        } else {
                            FieldCheck::valid()
                        }
                    }
                    Err(err) => {
                        tracing::warn!("Duplicate company check failed: {}", err);
                        FieldCheck::valid()
                    }
                }
            }
        }),
    )])
}

fn strip_server_fields(mut data: FormData) -> FormData {
    for key in SERVER_FIELDS {
        data.remove(key);
    }
    data
}

fn trim_names(mut data: FormData) -> FormData {
    for key in ["first_name", "last_name"] {
        if let Some(Value::String(s)) = data.get_mut(key) {
            *s = s.trim().to_string();
        }
    }
    data
}

/// Records of `kind` pointing at `id` through the attribute `field`
pub fn related_records<'a>(
    cache: &'a RecordCache,
    kind: EntityKind,
    field: &str,
    id: &RecordId,
) -> Vec<&'a Value> {
    cache
        .records(kind)
        .iter()
        .filter(|r| !is_missing(r.get(field)))
        .filter(|r| r.get(field).and_then(RecordId::from_value).as_ref() == Some(id))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use jobtrack_client::InMemoryBackend;
    use jobtrack_core::Validatable;
    use jobtrack_schema::{flatten_fields, validate_groups};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio_test::block_on;

    fn form(value: Value) -> FormData {
        value.as_object().cloned().unwrap_or_default()
    }

    fn backend() -> Rc<dyn Backend> {
        Rc::new(InMemoryBackend::new())
    }

    fn cache_with_companies() -> RecordCache {
        let mut cache = RecordCache::new();
        cache.set_records(
            EntityKind::Company,
            vec![json!({"id": 1, "name": "Acme"}), json!({"id": 2, "name": "Globex"})],
        );
        cache
    }

    #[test]
    fn test_endpoint_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_endpoint(kind.endpoint()), Some(kind));
        }
        assert_eq!(EntityKind::from_endpoint("/companies/"), Some(EntityKind::Company));
        assert_eq!(EntityKind::from_endpoint("files"), None);
    }

    #[test]
    fn test_titles() {
        assert_eq!(
            EntityKind::Contact.title(&form(json!({"first_name": "Ada", "last_name": "Lovelace"}))),
            "Ada Lovelace"
        );
        assert_eq!(
            EntityKind::Location.title(&form(json!({"city": "Berlin", "country": ""}))),
            "Berlin"
        );
        assert_eq!(EntityKind::Company.title(&form(json!({"id": 7}))), "Company #7");
        assert_eq!(EntityKind::Company.title(&FormData::new()), "New company");
    }

    #[test]
    fn test_layouts_are_valid() {
        let cache = cache_with_companies();
        for kind in EntityKind::ALL {
            assert!(validate_groups(&kind.form(&cache)).is_ok(), "{} form", kind);
            assert!(validate_groups(&kind.view(&cache)).is_ok(), "{} view", kind);
        }
    }

    #[test]
    fn test_lookup_select_disabled_while_loading() {
        let mut cache = RecordCache::new();
        cache.start_loading(EntityKind::Company);

        let groups = EntityKind::Contact.form(&cache);
        let company = flatten_fields(&groups)
            .into_iter()
            .find(|f| f.name == "company")
            .cloned();
        let company = company.unwrap();
        assert!(company.disabled);
        assert!(company.options().is_empty());
        assert!(company.validate().is_ok());
    }

    #[test]
    fn test_lookup_select_uses_cached_records() {
        let cache = cache_with_companies();
        let options = lookup_options(EntityKind::Company, &cache);

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].value, json!(1));
        assert_eq!(options[0].label, "Acme");
    }

    #[test]
    fn test_company_view_gets_contact_tab() {
        let cache = cache_with_companies();
        let scopes = EntityKind::Company.scopes(
            Some(form(json!({"id": 1, "name": "Acme"}))),
            Submode::View,
            &cache,
            &backend(),
        );

        assert_eq!(scopes.len(), 2);
        assert_eq!(scopes[1].endpoint, "contacts");
        assert_eq!(scopes[1].submode, Submode::Add);
        assert_eq!(scopes[1].data.get("company"), Some(&json!(1)));
    }

    #[test]
    fn test_new_company_has_single_tab() {
        let scopes = EntityKind::Company.scopes(
            None,
            Submode::Add,
            &RecordCache::new(),
            &backend(),
        );
        assert_eq!(scopes.len(), 1);
    }

    #[test]
    fn test_duplicate_company_name_rejected() {
        let backend: Rc<dyn Backend> = Rc::new(
            InMemoryBackend::new().with_records("companies", vec![json!({"id": 1, "name": "Acme"})]),
        );
        let scope = EntityKind::Company.scope(
            form(json!({"name": "Acme"})),
            Submode::Add,
            &RecordCache::new(),
            &backend,
        );

        let errors = block_on(scope.pipeline().validate(&form(json!({"name": "Acme"}))));
        assert_eq!(errors.get("name"), Some("A company named \"Acme\" already exists"));
    }

    #[test]
    fn test_company_may_keep_its_own_name() {
        let backend: Rc<dyn Backend> = Rc::new(
            InMemoryBackend::new().with_records("companies", vec![json!({"id": 1, "name": "Acme"})]),
        );
        let data = form(json!({"id": 1, "name": "Acme"}));
        let scope =
            EntityKind::Company.scope(data.clone(), Submode::Edit, &RecordCache::new(), &backend);

        let errors = block_on(scope.pipeline().validate(&data));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_offer_needs_salary() {
        let cache = cache_with_companies();
        let data = form(json!({"role": "Engineer", "company": 1, "status": "offer"}));
        let scope = EntityKind::Application.scope(data.clone(), Submode::Add, &cache, &backend());

        let errors = block_on(scope.pipeline().validate(&data));
        assert_eq!(errors.get("salary"), Some("An offer needs a salary"));
    }

    #[test]
    fn test_salary_bounds_checked() {
        let cache = cache_with_companies();
        let data = form(json!({
            "role": "Engineer",
            "company": 1,
            "status": "applied",
            "salary": {"min": 70000, "max": 50000, "currency": "EUR"}
        }));
        let scope = EntityKind::Application.scope(data.clone(), Submode::Add, &cache, &backend());

        let errors = block_on(scope.pipeline().validate(&data));
        assert_eq!(
            errors.get("salary"),
            Some("Minimum salary cannot exceed the maximum")
        );
    }

    #[test]
    fn test_transform_strips_server_fields() {
        let data = strip_server_fields(form(json!({
            "id": 1,
            "name": "Acme",
            "created_at": "2024-01-01T00:00:00Z",
            "company_name": "Acme"
        })));
        assert_eq!(Value::Object(data), json!({"id": 1, "name": "Acme"}));
    }

    #[test]
    fn test_related_records() {
        let mut cache = RecordCache::new();
        cache.set_records(
            EntityKind::Contact,
            vec![
                json!({"id": 1, "first_name": "Ada", "company": 1}),
                json!({"id": 2, "first_name": "Bob", "company": 2}),
                json!({"id": 3, "first_name": "Cy", "company": null}),
            ],
        );

        let related = related_records(&cache, EntityKind::Contact, "company", &RecordId::Int(1));
        assert_eq!(related.len(), 1);
        assert_eq!(related[0]["first_name"], json!("Ada"));
    }
}
