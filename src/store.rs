use std::mem;

use thiserror::Error;

use crate::model::{Customer, CustomerId};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("no customer with id {0}")]
pub struct NotFound(pub CustomerId);

pub type Listener = Box<dyn FnMut(&[Customer])>;

/// Session-scoped customer collection, insertion order preserved.
///
/// Created once at session start and handed to whoever needs it; nothing is
/// persisted past the session. Listeners run synchronously after every
/// mutation, in subscription order.
#[derive(Default)]
pub struct CustomerStore {
    customers: Vec<Customer>,
    listeners: Vec<Listener>,
}

impl CustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, customer: Customer) {
        self.customers.push(customer);
        self.notify();
    }

    /// Replaces the record with the matching id, keeping its position.
    /// The missing-id case is advisory; callers that don't care can drop it.
    pub fn update(&mut self, customer: Customer) -> Result<(), NotFound> {
        match self.customers.iter_mut().find(|x| x.id == customer.id) {
            Some(slot) => {
                *slot = customer;
                self.notify();
                Ok(())
            }
            None => Err(NotFound(customer.id)),
        }
    }

    pub fn delete(&mut self, id: &CustomerId) -> Result<(), NotFound> {
        match self.customers.iter().position(|x| &x.id == id) {
            Some(index) => {
                self.customers.remove(index);
                self.notify();
                Ok(())
            }
            None => Err(NotFound(id.clone())),
        }
    }

    pub fn get(&self, id: &CustomerId) -> Option<&Customer> {
        self.customers.iter().find(|x| &x.id == id)
    }

    pub fn list(&self) -> &[Customer] {
        &self.customers
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    fn notify(&mut self) {
        let mut listeners = mem::take(&mut self.listeners);
        for listener in &mut listeners {
            listener(&self.customers);
        }
        self.listeners = listeners;
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::model::Address;

    fn customer(pan: &str) -> Customer {
        Customer {
            id: CustomerId::generate(),
            pan: pan.to_string(),
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            mobile: "9876543210".to_string(),
            addresses: vec![Address {
                line1: "1 Marine Drive".to_string(),
                postcode: "400001".to_string(),
                ..Address::default()
            }],
        }
    }

    #[test]
    fn list_preserves_insertion_order() {
        let mut store = CustomerStore::new();
        store.add(customer("ABCDE1234F"));
        store.add(customer("FGHIJ5678K"));

        let pans: Vec<_> = store.list().iter().map(|x| x.pan.as_str()).collect();
        assert_eq!(pans, ["ABCDE1234F", "FGHIJ5678K"]);
    }

    #[test]
    fn update_replaces_in_place() {
        let mut store = CustomerStore::new();
        store.add(customer("ABCDE1234F"));
        store.add(customer("FGHIJ5678K"));

        let mut edited = store.list()[0].clone();
        edited.full_name = "Janet Doe".to_string();
        let id = edited.id.clone();
        store.update(edited).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].id, id);
        assert_eq!(store.list()[0].full_name, "Janet Doe");
    }

    #[test]
    fn update_unknown_id_reports_not_found() {
        let mut store = CustomerStore::new();
        store.add(customer("ABCDE1234F"));

        let stray = customer("FGHIJ5678K");
        let id = stray.id.clone();
        assert_eq!(store.update(stray), Err(NotFound(id)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_removes_exactly_one() {
        let mut store = CustomerStore::new();
        store.add(customer("ABCDE1234F"));
        store.add(customer("FGHIJ5678K"));
        let id = store.list()[0].id.clone();

        store.delete(&id).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].pan, "FGHIJ5678K");

        assert_eq!(store.delete(&id), Err(NotFound(id)));
    }

    #[test]
    fn listeners_run_synchronously_after_each_mutation() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let inner = seen.clone();

        let mut store = CustomerStore::new();
        store.subscribe(Box::new(move |customers| {
            inner.borrow_mut().push(customers.len());
        }));

        store.add(customer("ABCDE1234F"));
        store.add(customer("FGHIJ5678K"));
        let id = store.list()[0].id.clone();
        store.delete(&id).unwrap();

        assert_eq!(*seen.borrow(), vec![1, 2, 1]);
    }
}
