use log::{debug, warn};
use thiserror::Error;

use crate::{
    lookup::{EnrichmentFailure, Locality, PanOutcome},
    model::{Address, Customer, CustomerId, MAX_ADDRESSES, MIN_ADDRESSES},
    store::CustomerStore,
    validate::{self, ValidationError},
};

/// Input length at which the PAN verification fires.
pub const PAN_LOOKUP_LEN: usize = 10;
/// Input length at which the postcode resolution fires (digits only).
pub const POSTCODE_LOOKUP_LEN: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AddressBound {
    #[error("a customer can have at most {MAX_ADDRESSES} addresses")]
    TooMany,
    #[error("a customer needs at least one address")]
    TooFew,
}

/// An enrichment call the driver should make, keyed by the field's value at
/// trigger time. The key comes back through `apply_*` so stale responses can
/// be told apart from current ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupRequest {
    Pan { pan: String },
    Postcode { index: usize, postcode: String },
}

#[derive(Clone, Debug, Default)]
pub struct AddressDraft {
    pub line1: String,
    pub line2: String,
    pub postcode: String,
    pub city: String,
    pub state: String,
    pending: Option<String>,
}

impl AddressDraft {
    pub fn has_locality(&self) -> bool {
        !self.city.is_empty() && !self.state.is_empty()
    }
}

/// The form workflow: synchronous field validation, lookup triggering, and
/// record assembly. Lookups are issued as [`LookupRequest`] values and their
/// responses fed back in; a response is applied only while the field still
/// holds the value it was requested for.
///
/// Submission gates on validation alone. In-flight lookups are best-effort
/// enrichment, never a gate.
#[derive(Debug, Default)]
pub struct CustomerForm {
    editing: Option<CustomerId>,
    pan: String,
    full_name: String,
    email: String,
    mobile: String,
    addresses: Vec<AddressDraft>,
    pan_pending: Option<String>,
}

impl CustomerForm {
    pub fn new() -> Self {
        Self {
            addresses: vec![AddressDraft::default()],
            ..Self::default()
        }
    }

    /// Prefilled form for an existing record; submission keeps its id.
    pub fn edit(customer: &Customer) -> Self {
        Self {
            editing: Some(customer.id.clone()),
            pan: customer.pan.clone(),
            full_name: customer.full_name.clone(),
            email: customer.email.clone(),
            mobile: customer.mobile.clone(),
            addresses: customer
                .addresses
                .iter()
                .map(|x| AddressDraft {
                    line1: x.line1.clone(),
                    line2: x.line2.clone().unwrap_or_default(),
                    postcode: x.postcode.clone(),
                    city: x.city.clone(),
                    state: x.state.clone(),
                    pending: None,
                })
                .collect(),
            pan_pending: None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn pan(&self) -> &str {
        &self.pan
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    pub fn addresses(&self) -> &[AddressDraft] {
        &self.addresses
    }

    pub fn set_pan(&mut self, value: &str) -> Option<LookupRequest> {
        self.pan = value.to_string();
        if value.len() == PAN_LOOKUP_LEN {
            self.pan_pending = Some(value.to_string());
            Some(LookupRequest::Pan {
                pan: value.to_string(),
            })
        } else {
            self.pan_pending = None;
            None
        }
    }

    pub fn set_full_name(&mut self, value: &str) {
        self.full_name = value.to_string();
    }

    pub fn set_email(&mut self, value: &str) {
        self.email = value.to_string();
    }

    pub fn set_mobile(&mut self, value: &str) {
        self.mobile = value.to_string();
    }

    pub fn set_line1(&mut self, index: usize, value: &str) {
        self.addresses[index].line1 = value.to_string();
    }

    pub fn set_line2(&mut self, index: usize, value: &str) {
        self.addresses[index].line2 = value.to_string();
    }

    /// Changing a postcode drops the locality derived from the old one.
    pub fn set_postcode(&mut self, index: usize, value: &str) -> Option<LookupRequest> {
        let address = &mut self.addresses[index];
        address.postcode = value.to_string();
        address.city.clear();
        address.state.clear();

        if value.len() == POSTCODE_LOOKUP_LEN && value.bytes().all(|x| x.is_ascii_digit()) {
            address.pending = Some(value.to_string());
            Some(LookupRequest::Postcode {
                index,
                postcode: value.to_string(),
            })
        } else {
            address.pending = None;
            None
        }
    }

    pub fn add_address(&mut self) -> Result<usize, AddressBound> {
        if self.addresses.len() >= MAX_ADDRESSES {
            return Err(AddressBound::TooMany);
        }
        self.addresses.push(AddressDraft::default());
        Ok(self.addresses.len() - 1)
    }

    /// Later entries shift down; the removed entry's pending lookup goes
    /// with it.
    pub fn remove_address(&mut self, index: usize) -> Result<(), AddressBound> {
        if self.addresses.len() <= MIN_ADDRESSES {
            return Err(AddressBound::TooFew);
        }
        self.addresses.remove(index);
        Ok(())
    }

    /// Applies a PAN verification response if the field still holds the
    /// value it was requested for; otherwise the response is stale and
    /// dropped. A positive result overwrites the full-name field. Failures
    /// are logged only.
    pub fn apply_pan_lookup(&mut self, pan: &str, outcome: Result<PanOutcome, EnrichmentFailure>) {
        if self.pan != pan {
            debug!("dropping stale PAN verification for {pan:?}");
            return;
        }
        if self.pan_pending.as_deref() == Some(pan) {
            self.pan_pending = None;
        }

        match outcome {
            Ok(PanOutcome::Verified { full_name }) => self.full_name = full_name,
            Ok(PanOutcome::Unverified) => debug!("PAN {pan:?} not recognised by the service"),
            Err(error) => warn!("PAN verification failed: {error}"),
        }
    }

    /// Applies a postcode resolution response to one address, same staleness
    /// rule as the PAN side: the row must still exist and still hold the
    /// requested postcode. City and state are set together.
    pub fn apply_postcode_lookup(
        &mut self,
        index: usize,
        postcode: &str,
        outcome: Result<Locality, EnrichmentFailure>,
    ) {
        let Some(address) = self.addresses.get_mut(index) else {
            debug!("dropping postcode resolution for removed address {index}");
            return;
        };
        if address.postcode != postcode {
            debug!("dropping stale postcode resolution for {postcode:?}");
            return;
        }
        if address.pending.as_deref() == Some(postcode) {
            address.pending = None;
        }

        match outcome {
            Ok(locality) => {
                address.city = locality.city;
                address.state = locality.state;
            }
            Err(error) => warn!("postcode resolution failed: {error}"),
        }
    }

    pub fn has_pending_lookups(&self) -> bool {
        self.pan_pending.is_some() || self.addresses.iter().any(|x| x.pending.is_some())
    }

    /// Every rule, every field, in display order.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let checks = [
            validate::pan(&self.pan),
            validate::full_name(&self.full_name),
            validate::email(&self.email),
            validate::mobile(&self.mobile),
        ];
        errors.extend(checks.into_iter().filter_map(Result::err));

        for (index, address) in self.addresses.iter().enumerate() {
            errors.extend(validate::line1(index, &address.line1).err());
            errors.extend(validate::postcode(index, &address.postcode).err());
        }
        errors
    }

    /// Validates everything, assembles the record, and dispatches it to the
    /// store: `update` with the preserved id in edit mode, `add` with a fresh
    /// one otherwise. Returning the id is the completion signal; it does not
    /// wait on in-flight lookups.
    pub fn submit(&mut self, store: &mut CustomerStore) -> Result<CustomerId, Vec<ValidationError>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let addresses = self
            .addresses
            .iter()
            .map(|x| Address {
                line1: x.line1.clone(),
                line2: (!x.line2.is_empty()).then(|| x.line2.clone()),
                postcode: x.postcode.clone(),
                city: x.city.clone(),
                state: x.state.clone(),
            })
            .collect();

        let id = match &self.editing {
            Some(id) => id.clone(),
            None => CustomerId::generate(),
        };
        let customer = Customer {
            id: id.clone(),
            pan: self.pan.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            mobile: self.mobile.clone(),
            addresses,
        };

        if self.editing.is_some() {
            if let Err(error) = store.update(customer) {
                // advisory only; the record went away mid-edit
                warn!("{error}");
            }
        } else {
            store.add(customer);
        }

        Ok(id)
    }
}
