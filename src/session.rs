use anyhow::Result;
use inquire::{error::InquireError, Confirm, Select, Text};
use itertools::Itertools;

use crate::{
    form::{CustomerForm, LookupRequest},
    lookup::{ResolvePostcode, VerifyPan},
    model::MAX_ADDRESSES,
    store::CustomerStore,
    validate::{self, ValidationError},
};

/// Interactive host loop: the stand-in for the listing view plus form host.
/// Owns the store for the session; nothing survives quitting.
pub fn run(mut store: CustomerStore, lookup: &(impl VerifyPan + ResolvePostcode)) -> Result<()> {
    store.subscribe(Box::new(|customers| {
        println!("({} customer(s) on record)", customers.len());
    }));

    loop {
        let action = match Select::new("Action", vec!["add", "edit", "delete", "list", "export", "quit"])
            .prompt()
        {
            Ok(x) => x,
            Err(InquireError::OperationCanceled) => break,
            Err(x) => return Err(x.into()),
        };

        match action {
            "add" => submit(CustomerForm::new(), &mut store, lookup)?,
            "edit" => {
                if let Some(index) = pick(&store)? {
                    let form = CustomerForm::edit(&store.list()[index]);
                    submit(form, &mut store, lookup)?;
                }
            }
            "delete" => {
                if let Some(index) = pick(&store)? {
                    let id = store.list()[index].id.clone();
                    let _ = store.delete(&id);
                }
            }
            "list" => list(&store),
            "export" => println!("{}", serde_json::to_string_pretty(store.list())?),
            _ => break,
        }
    }

    Ok(())
}

fn list(store: &CustomerStore) {
    if store.is_empty() {
        println!("no customers yet");
        return;
    }
    for x in store.list() {
        println!(
            "{:<12} {:<24} {:<28} {:<12} {}",
            x.pan,
            x.full_name,
            x.email,
            x.mobile,
            x.addresses.iter().map(|a| a.postcode.as_str()).join(", "),
        );
    }
}

fn pick(store: &CustomerStore) -> Result<Option<usize>> {
    if store.is_empty() {
        println!("no customers yet");
        return Ok(None);
    }

    let labels = store
        .list()
        .iter()
        .map(|x| format!("{} {} ({})", x.pan, x.full_name, x.id))
        .collect();
    match Select::new("Customer", labels).raw_prompt() {
        Ok(choice) => Ok(Some(choice.index)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(x) => Err(x.into()),
    }
}

fn submit(
    mut form: CustomerForm,
    store: &mut CustomerStore,
    lookup: &(impl VerifyPan + ResolvePostcode),
) -> Result<()> {
    fill(&mut form, lookup)?;

    match form.submit(store) {
        Ok(id) => println!("saved {id}"),
        Err(errors) => {
            // per-field prompts re-validate, so only cross-cutting slips land here
            for x in errors {
                println!("! {x}");
            }
        }
    }
    Ok(())
}

fn fill(form: &mut CustomerForm, lookup: &(impl VerifyPan + ResolvePostcode)) -> Result<()> {
    let mut value = form.pan().to_string();
    loop {
        value = Text::new("PAN").with_initial_value(&value).prompt()?;
        if let Some(request) = form.set_pan(&value) {
            run_lookup(form, lookup, request);
        }
        match validate::pan(form.pan()) {
            Ok(()) => break,
            Err(x) => println!("! {x}"),
        }
    }

    // a verified PAN has already filled this in; offered as the initial value
    let full_name = field("Full name", form.full_name(), validate::full_name)?;
    form.set_full_name(&full_name);

    let email = field("Email", form.email(), validate::email)?;
    form.set_email(&email);

    let mobile = field("Mobile", form.mobile(), validate::mobile)?;
    form.set_mobile(&mobile);

    let mut index = 0;
    loop {
        if index < form.addresses().len() {
            if fill_address(form, lookup, index)? {
                index += 1;
            }
            // on removal the next row shifts into this slot
            continue;
        }

        if form.addresses().len() >= MAX_ADDRESSES {
            break;
        }
        if Confirm::new("Add another address?")
            .with_default(false)
            .prompt()?
        {
            form.add_address().expect("bounds just checked");
        } else {
            break;
        }
    }

    Ok(())
}

/// Returns false when the row was removed instead of filled.
fn fill_address(
    form: &mut CustomerForm,
    lookup: &(impl VerifyPan + ResolvePostcode),
    index: usize,
) -> Result<bool> {
    println!("Address {}", index + 1);

    if form.is_editing()
        && !form.addresses()[index].line1.is_empty()
        && Confirm::new("Remove this address?")
            .with_default(false)
            .prompt()?
    {
        match form.remove_address(index) {
            Ok(()) => return Ok(false),
            Err(x) => println!("! {x}"),
        }
    }

    let line1 = field("Line 1", &form.addresses()[index].line1, |x| {
        validate::line1(index, x)
    })?;
    form.set_line1(index, &line1);

    let line2 = Text::new("Line 2 (optional)")
        .with_initial_value(&form.addresses()[index].line2)
        .prompt()?;
    form.set_line2(index, &line2);

    let mut value = form.addresses()[index].postcode.to_string();
    loop {
        value = Text::new("Postcode").with_initial_value(&value).prompt()?;
        if let Some(request) = form.set_postcode(index, &value) {
            run_lookup(form, lookup, request);
        }
        match validate::postcode(index, &form.addresses()[index].postcode) {
            Ok(()) => break,
            Err(x) => println!("! {x}"),
        }
    }

    let address = &form.addresses()[index];
    if address.has_locality() {
        println!("  {}, {}", address.city, address.state);
    }

    Ok(true)
}

fn field(
    label: &str,
    initial: &str,
    check: impl Fn(&str) -> Result<(), ValidationError>,
) -> Result<String> {
    let mut value = initial.to_string();
    loop {
        value = Text::new(label).with_initial_value(&value).prompt()?;
        match check(&value) {
            Ok(()) => return Ok(value),
            Err(x) => println!("! {x}"),
        }
    }
}

fn run_lookup(
    form: &mut CustomerForm,
    lookup: &(impl VerifyPan + ResolvePostcode),
    request: LookupRequest,
) {
    match request {
        LookupRequest::Pan { pan } => {
            let outcome = lookup.verify(&pan);
            form.apply_pan_lookup(&pan, outcome);
        }
        LookupRequest::Postcode { index, postcode } => {
            let outcome = lookup.resolve(&postcode);
            form.apply_postcode_lookup(index, &postcode, outcome);
        }
    }
}
