use proc_macro::TokenStream;
use quote::quote;
use syn::{
    DataStruct, DeriveInput, Expr, Field, Fields, GenericArgument, LitStr, Path, PathArguments,
    Result, Token, Type,
};

const DEFAULT_ID_FIELD: &str = "id";
const STORED_ID_FIELD: &str = "_id";
const LEGACY_OBJECT_ID_HELPER: &str = "legacy_object_id";

struct EntityAttributes {
    collection: Option<String>,
    parent: Option<Path>,
    id_field: String,
    object_id: bool,
}

fn parse_attributes(ast: &DeriveInput) -> Result<EntityAttributes> {
    let mut attributes = EntityAttributes {
        collection: None,
        parent: None,
        id_field: DEFAULT_ID_FIELD.to_string(),
        object_id: false,
    };
    let mut id_found = false;

    for attr in &ast.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value = meta.value()?;
                let s: LitStr = value.parse()?;
                if s.value().trim().is_empty() {
                    return Err(meta.error("Collection name cannot be empty"));
                }
                attributes.collection = Some(s.value());
                Ok(())
            } else if meta.path.is_ident("parent") {
                let value = meta.value()?;
                attributes.parent = Some(value.parse()?);
                Ok(())
            } else if meta.path.is_ident("id") {
                if id_found {
                    return Err(meta.error("Multiple id attributes are not allowed"));
                }
                id_found = true;

                meta.parse_nested_meta(|meta| {
                    if meta.path.is_ident("field") {
                        let value = meta.value()?;
                        let s: LitStr = value.parse()?;
                        attributes.id_field = s.value();
                        Ok(())
                    } else if meta.path.is_ident("object_id") {
                        attributes.object_id = true;
                        Ok(())
                    } else {
                        Err(meta.error("Unknown id attribute"))
                    }
                })
            } else {
                Err(meta.error("Unknown entity attribute"))
            }
        })?
    }

    Ok(attributes)
}

// K for a field declared as Option<K>
fn option_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    match arguments.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn is_string_type(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "String"),
        _ => false,
    }
}

// what the field's #[serde(...)] attributes say about how the id is stored
#[derive(Default)]
struct SerdeIdOptions {
    serialize_name: Option<String>,
    deserialize_name: Option<String>,
    with: Option<String>,
}

fn skip_serde_option(meta: &syn::meta::ParseNestedMeta) -> Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.parse::<proc_macro2::TokenStream>()?;
    }
    Ok(())
}

fn parse_serde_options(field: &Field) -> Result<SerdeIdOptions> {
    let mut options = SerdeIdOptions::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if meta.input.peek(Token![=]) {
                    let name: LitStr = meta.value()?.parse()?;
                    options.serialize_name = Some(name.value());
                    options.deserialize_name = Some(name.value());
                    Ok(())
                } else {
                    meta.parse_nested_meta(|meta| {
                        let name: LitStr = meta.value()?.parse()?;
                        if meta.path.is_ident("serialize") {
                            options.serialize_name = Some(name.value());
                        } else if meta.path.is_ident("deserialize") {
                            options.deserialize_name = Some(name.value());
                        }
                        Ok(())
                    })
                }
            } else if meta.path.is_ident("with") {
                let helper: LitStr = meta.value()?.parse()?;
                options.with = Some(helper.value());
                Ok(())
            } else {
                skip_serde_option(&meta)
            }
        })?;
    }

    Ok(options)
}

/// The identifier must be stored in `_id`, and an `object_id` identifier must go
/// through the `legacy_object_id` serde helper so storage and lookups agree.
fn check_id_storage(field: &Field, attributes: &EntityAttributes) -> Result<()> {
    let options = parse_serde_options(field)?;

    let stored_as_id = options.serialize_name.as_deref() == Some(STORED_ID_FIELD)
        && options.deserialize_name.as_deref() == Some(STORED_ID_FIELD);
    if !stored_as_id {
        return Err(syn::Error::new_spanned(
            field,
            format!(
                "Identifier field {} must be stored as {}, add #[serde(rename = \"{}\")]",
                attributes.id_field, STORED_ID_FIELD, STORED_ID_FIELD
            ),
        ));
    }

    if attributes.object_id {
        let uses_helper = options.with.as_deref().is_some_and(|path| {
            path.rsplit("::").next() == Some(LEGACY_OBJECT_ID_HELPER)
        });
        if !uses_helper {
            return Err(syn::Error::new_spanned(
                field,
                format!(
                    "object_id requires #[serde(with = \"mongorepo::repository::{}\")] on field {}",
                    LEGACY_OBJECT_ID_HELPER, attributes.id_field
                ),
            ));
        }
    }

    Ok(())
}

pub(crate) fn generate_entity_for_struct(
    ast: &DeriveInput,
    data: &DataStruct,
) -> Result<TokenStream> {
    let name = &ast.ident;
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "Generic entity types are not supported",
        ));
    }

    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            ast,
            "Only structs with named fields are supported",
        ));
    };

    let attributes = parse_attributes(ast)?;
    let id_field_name = &attributes.id_field;

    let id_field = fields
        .named
        .iter()
        .find(|field| {
            field
                .ident
                .as_ref()
                .is_some_and(|ident| ident == id_field_name)
        })
        .ok_or_else(|| {
            syn::Error::new_spanned(
                ast,
                format!("Field {} not found in struct", id_field_name),
            )
        })?;

    let id_type = option_inner_type(&id_field.ty).ok_or_else(|| {
        syn::Error::new_spanned(
            &id_field.ty,
            format!("Identifier field {} must be declared as Option<_>", id_field_name),
        )
    })?;

    if attributes.object_id && !is_string_type(id_type) {
        return Err(syn::Error::new_spanned(
            &id_field.ty,
            "object_id requires an Option<String> identifier",
        ));
    }

    check_id_storage(id_field, &attributes)?;

    let id_ident = &id_field.ident;
    let type_name = name.to_string();
    let object_id = attributes.object_id;

    let collection_code = attributes.collection.map(|collection| {
        quote! { .with_collection_name(#collection) }
    });
    let parent_code = attributes.parent.map(|parent| {
        quote! { .with_parent(<#parent as mongorepo::repository::Entity>::entity_type) }
    });

    let gen = quote! {
        impl mongorepo::repository::Entity for #name {
            type Id = #id_type;

            fn entity_type() -> &'static mongorepo::repository::EntityType {
                static ENTITY_TYPE: mongorepo::repository::EntityType =
                    mongorepo::repository::EntityType::new(#type_name, std::any::TypeId::of::<#name>)
                        .with_id_field(#id_field_name)
                        .with_legacy_object_id(#object_id)
                        #collection_code
                        #parent_code;
                &ENTITY_TYPE
            }

            fn id(&self) -> Option<&Self::Id> {
                self.#id_ident.as_ref()
            }

            fn set_id(&mut self, id: Self::Id) {
                self.#id_ident = Some(id);
            }
        }
    };

    Ok(TokenStream::from(gen))
}
