//! In-process stand-in for the hosted mock REST API.
//!
//! [`MockApi`] serves `/api/v1/{collection}` and `/api/v1/{collection}/{id}`
//! for a fixed set of collections with the same observable behaviour as the
//! hosted service:
//!
//! - `GET` on a collection returns every record in insertion order;
//! - `POST` assigns the next numeric id (as a string) and answers `201`;
//! - `PUT` merges the submitted fields into the stored record;
//! - `DELETE` removes the record and echoes it back;
//! - unknown ids answer `404` with the JSON string `"Not found"`.
//!
//! Each server owns its own store, so every test starts from an empty
//! dataset unless it seeds one with [`MockApi::insert`].

use std::{
    collections::HashMap,
    io,
    net::{SocketAddr, TcpListener, TcpStream},
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use serde_json::{Map, Value};

use crate::wire::{RecordedRequest, read_request, reason_phrase, write_response};

const NOT_FOUND_BODY: &str = "\"Not found\"";

/// Collection names served by [`MockApi::start`].
pub const DEFAULT_COLLECTIONS: [&str; 2] = ["clients", "resources"];

#[derive(Debug, Default)]
struct Collection {
    records: Vec<Value>,
    next_id: u64,
}

impl Collection {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record_id(record).as_deref() == Some(id))
    }
}

#[derive(Debug, Default)]
struct Store {
    collections: HashMap<String, Collection>,
    requests: Vec<RecordedRequest>,
}

struct Reply {
    status: u16,
    body: String,
}

impl Reply {
    fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            body: value.to_string(),
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            body: NOT_FOUND_BODY.to_owned(),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, &Value::String(message.to_owned()))
    }
}

/// Running mock API server.
///
/// Dropping the value stops the accept loop and joins the server thread.
#[derive(Debug)]
#[must_use]
pub struct MockApi {
    addr: SocketAddr,
    store: Arc<Mutex<Store>>,
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MockApi {
    /// Start a server for the `clients` and `resources` collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the loopback listener cannot be bound.
    pub fn start() -> io::Result<Self> {
        Self::with_collections(&DEFAULT_COLLECTIONS)
    }

    /// Start a server for an explicit set of collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the loopback listener cannot be bound.
    pub fn with_collections(names: &[&str]) -> io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        let addr = listener.local_addr()?;
        let store = Store {
            collections: names
                .iter()
                .map(|name| ((*name).to_owned(), Collection::default()))
                .collect(),
            requests: Vec::new(),
        };
        let store = Arc::new(Mutex::new(store));
        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = {
            let server_store = Arc::clone(&store);
            let server_shutdown = Arc::clone(&shutdown);
            thread::spawn(move || serve(&listener, &server_store, &server_shutdown))
        };
        Ok(Self {
            addr,
            store,
            shutdown,
            handle: Some(handle),
        })
    }

    /// Base URL without a trailing slash, for example `http://127.0.0.1:4000`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Store `record` directly, bypassing validation.
    ///
    /// A missing `id` is assigned from the collection counter. Malformed
    /// records are kept verbatim, which lets tests serve bodies that violate
    /// a schema. Returns the record id.
    ///
    /// # Panics
    ///
    /// Panics if `collection` is not served or `record` is not an object.
    pub fn insert(&self, collection: &str, record: Value) -> String {
        let mut store = self.lock();
        let entries = store
            .collections
            .get_mut(collection)
            .unwrap_or_else(|| panic!("collection '{collection}' is not served"));
        let Value::Object(mut fields) = record else {
            panic!("mock records must be JSON objects");
        };
        let id = match fields.get("id").and_then(Value::as_str) {
            Some(id) => id.to_owned(),
            None => {
                let id = entries.allocate_id();
                fields.insert("id".to_owned(), Value::String(id.clone()));
                id
            }
        };
        entries.records.push(Value::Object(fields));
        id
    }

    /// Snapshot of the records in `collection`.
    #[must_use]
    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.lock()
            .collections
            .get(collection)
            .map(|entries| entries.records.clone())
            .unwrap_or_default()
    }

    /// Every request served so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Connect to unblock the accept loop; the outcome is irrelevant.
        let _ = TcpStream::connect(self.addr);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(listener: &TcpListener, store: &Mutex<Store>, shutdown: &AtomicBool) {
    for incoming in listener.incoming() {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        if let Ok(stream) = incoming {
            handle_connection(stream, store);
        }
    }
}

fn handle_connection(mut stream: TcpStream, store: &Mutex<Store>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let Ok(Some(request)) = read_request(&stream) else {
        return;
    };
    let reply = {
        let mut guard = store
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let reply = route(&mut guard, &request);
        guard.requests.push(request);
        reply
    };
    let _ = write_response(
        &mut stream,
        reply.status,
        reason_phrase(reply.status),
        &reply.body,
    );
}

fn route(store: &mut Store, request: &RecordedRequest) -> Reply {
    let segments: Vec<&str> = request
        .path
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    let (collection, id) = match segments.as_slice() {
        ["api", "v1", collection] => (*collection, None),
        ["api", "v1", collection, id] => (*collection, Some(decode_segment(id))),
        _ => return Reply::not_found(),
    };
    let Some(entries) = store.collections.get_mut(collection) else {
        return Reply::not_found();
    };
    match (request.method.as_str(), id) {
        ("GET", None) => Reply::json(200, &Value::Array(entries.records.clone())),
        ("POST", None) => create(entries, &request.body),
        ("GET", Some(id)) => entries
            .position(&id)
            .and_then(|index| entries.records.get(index))
            .map_or_else(Reply::not_found, |record| Reply::json(200, record)),
        ("PUT", Some(id)) => update(entries, &id, &request.body),
        ("DELETE", Some(id)) => match entries.position(&id) {
            Some(index) => Reply::json(200, &entries.records.remove(index)),
            None => Reply::not_found(),
        },
        _ => Reply::error(405, "Method not allowed"),
    }
}

fn create(entries: &mut Collection, body: &str) -> Reply {
    let Some(mut fields) = parse_object(body) else {
        return Reply::error(400, "Body must be a JSON object");
    };
    let id = entries.allocate_id();
    fields.insert("id".to_owned(), Value::String(id));
    let record = Value::Object(fields);
    entries.records.push(record.clone());
    Reply::json(201, &record)
}

fn update(entries: &mut Collection, id: &str, body: &str) -> Reply {
    let Some(fields) = parse_object(body) else {
        return Reply::error(400, "Body must be a JSON object");
    };
    let Some(record) = entries
        .position(id)
        .and_then(|index| entries.records.get_mut(index))
    else {
        return Reply::not_found();
    };
    if let Value::Object(stored) = record {
        for (key, value) in fields {
            if key != "id" {
                stored.insert(key, value);
            }
        }
    }
    Reply::json(200, record)
}

fn parse_object(body: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(body) {
        Ok(Value::Object(fields)) => Some(fields),
        _ => None,
    }
}

fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn decode_segment(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while let Some(&byte) = bytes.get(index) {
        let escaped = (byte == b'%')
            .then(|| bytes.get(index + 1..index + 3))
            .flatten()
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        if let Some(value) = escaped {
            decoded.push(value);
            index += 3;
        } else {
            decoded.push(byte);
            index += 1;
        }
    }
    String::from_utf8_lossy(&decoded).into_owned()
}
