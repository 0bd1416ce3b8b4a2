use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use anyhow::Result;
use clap::Args;
use contactbook_core::{ContactId, ContactRecord, LabeledValue, RawContact, RawLabeledValue};
use std::str::FromStr;

#[derive(Debug, Args)]
pub struct ListArgs {}

#[derive(Debug, Args)]
pub struct IdsArgs {}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct MeArgs {}

pub fn list_contacts(ctx: &Context<'_>, _args: ListArgs) -> Result<()> {
    let contacts = ctx.book.get_all_contacts()?;
    if ctx.json {
        return print_json(&contacts);
    }

    if contacts.is_empty() {
        println!("No contacts.");
        return Ok(());
    }
    for contact in &contacts {
        println!("{}", format_contact_line(contact));
    }
    Ok(())
}

pub fn list_ids(ctx: &Context<'_>, _args: IdsArgs) -> Result<()> {
    let ids = ctx.book.get_all_contact_ids()?;
    if ctx.json {
        return print_json(&ids);
    }
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

pub fn show_contact(ctx: &Context<'_>, args: ShowArgs) -> Result<()> {
    let id = parse_contact_id(&args.id)?;
    let contact = ctx
        .book
        .get_contact_by_id(&id)?
        .ok_or_else(|| not_found(format!("contact {id}")))?;

    if ctx.json {
        return print_json(&contact);
    }
    print_raw_contact(&contact);
    Ok(())
}

pub fn show_me(ctx: &Context<'_>, _args: MeArgs) -> Result<()> {
    let me = ctx.book.get_me()?;
    if ctx.json {
        return match me {
            Some(record) => print_json(&record),
            None => print_json(&serde_json::json!({})),
        };
    }

    match me {
        Some(record) => {
            println!("{}", format_contact_line(&record));
            print_labeled("emails", &record.emails);
            print_labeled("phones", &record.phone_numbers);
        }
        None => println!("No me card configured."),
    }
    Ok(())
}

fn parse_contact_id(raw: &str) -> Result<ContactId> {
    ContactId::from_str(raw.trim()).map_err(|_| invalid_input("contact id cannot be empty"))
}

fn format_contact_line(contact: &ContactRecord) -> String {
    let id = contact
        .id
        .as_ref()
        .map(ContactId::as_str)
        .unwrap_or("-");
    let name = contact
        .display_name()
        .unwrap_or_else(|| "(no name)".to_string());
    match contact.emails.iter().find_map(|email| email.value.as_deref()) {
        Some(email) => format!("{id}  {name}  <{email}>"),
        None => format!("{id}  {name}"),
    }
}

fn print_labeled(title: &str, values: &[LabeledValue]) {
    if values.is_empty() {
        return;
    }
    println!("{title}:");
    for value in values {
        println!("- {}: {}", value.label, value.value.as_deref().unwrap_or(""));
    }
}

fn print_raw_contact(contact: &RawContact) {
    if let Some(id) = &contact.id {
        println!("id: {}", id);
    }
    let fields = [
        ("first name", &contact.first_name),
        ("middle name", &contact.middle_name),
        ("last name", &contact.last_name),
        ("nickname", &contact.nickname),
        ("organization", &contact.organization),
        ("job title", &contact.job_title),
        ("birthday", &contact.birthday),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{label}: {value}");
        }
    }
    print_raw_labeled("emails", contact.emails.as_deref());
    print_raw_labeled("phones", contact.phone_numbers.as_deref());
    if let Some(image) = &contact.image {
        println!("image: {} bytes", image.len());
    }
    for (key, value) in contact.extra.iter() {
        println!("{key}: {value}");
    }
}

fn print_raw_labeled(title: &str, values: Option<&[RawLabeledValue]>) {
    let Some(values) = values.filter(|values| !values.is_empty()) else {
        return;
    };
    println!("{title}:");
    for value in values {
        println!("- {}: {}", value.label, value.value.as_deref().unwrap_or(""));
    }
}
