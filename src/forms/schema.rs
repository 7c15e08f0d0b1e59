use crate::core::domain::{model::resource_type::ResourceType, value_object::FieldRule};

/// A form field and the checks applied to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rules: &'static [FieldRule],
}

const fn field(name: &'static str, rules: &'static [FieldRule]) -> FieldSpec {
    FieldSpec { name, rules }
}

const NAME: FieldSpec = field("name", &[FieldRule::Required]);

const OU: &[FieldSpec] = &[NAME, field("extra", &[])];

const USER: &[FieldSpec] = &[
    NAME,
    field("first_name", &[]),
    field("last_name", &[]),
    field("email", &[FieldRule::Email]),
    field("phone", &[FieldRule::Tel]),
    field("address", &[]),
];

const COMPUTER: &[FieldSpec] = &[
    NAME,
    field("ip", &[FieldRule::Ip]),
    field("mac", &[]),
    field("family", &[]),
    field("serial", &[]),
    field("registry", &[]),
    field("node_chef_id", &[]),
];

const PRINTER: &[FieldSpec] = &[
    NAME,
    field("printtype", &[FieldRule::Required]),
    field("manufacturer", &[FieldRule::Required]),
    field("model", &[FieldRule::Required]),
    field("serial", &[]),
    field("registry", &[]),
    field("connection", &[FieldRule::Required]),
    field("uri", &[FieldRule::Required, FieldRule::Url]),
    field("ppd_uri", &[FieldRule::Url]),
];

const GROUP: &[FieldSpec] = &[NAME];

const STORAGE: &[FieldSpec] = &[NAME, field("uri", &[FieldRule::Required, FieldRule::Url])];

const REPOSITORY: &[FieldSpec] = &[
    NAME,
    field("uri", &[FieldRule::Required, FieldRule::Url]),
    field("distribution", &[]),
    field("components", &[]),
    field("repo_key", &[]),
    field("key_server", &[]),
];

/// Editable fields of a resource type, in display order.
pub fn form_schema(resource_type: ResourceType) -> &'static [FieldSpec] {
    match resource_type {
        ResourceType::Ou => OU,
        ResourceType::User => USER,
        ResourceType::Computer => COMPUTER,
        ResourceType::Printer => PRINTER,
        ResourceType::Group => GROUP,
        ResourceType::Storage => STORAGE,
        ResourceType::Repository => REPOSITORY,
    }
}
