// In-process stand-ins for the document, user and collaboration services.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use uuid::Uuid;

use crate::clients::{
    ClientError, CollaborationLayer, ContentStore, MembershipProvider, UserDirectory,
};
use crate::context::RequestContext;
use crate::protocol::UserSummary;

#[derive(Clone, Debug)]
pub struct Event {
    pub name: &'static str,
    pub document_id: Uuid,
    pub at: Instant,
}

/// Ordered record of side effects shared between fakes.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn record(&self, name: &'static str, document_id: Uuid) {
        self.0.lock().unwrap().push(Event {
            name,
            document_id,
            at: Instant::now(),
        });
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }
}

fn credential_of(ctx: &RequestContext) -> Option<String> {
    ctx.credential()
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

struct FakeDocument {
    owner: Uuid,
    collaborators: HashSet<Uuid>,
    content: Vec<u8>,
}

pub struct FakeDocuments {
    docs: Mutex<HashMap<Uuid, FakeDocument>>,
    write_delay: Mutex<Duration>,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
    pub fail_lookups: AtomicBool,
    pub credentials: Mutex<Vec<Option<String>>>,
    events: EventLog,
}

impl FakeDocuments {
    pub fn new(events: EventLog) -> Self {
        Self {
            docs: Mutex::new(HashMap::new()),
            write_delay: Mutex::new(Duration::ZERO),
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            fail_lookups: AtomicBool::new(false),
            credentials: Mutex::new(Vec::new()),
            events,
        }
    }

    pub fn add_document(&self, owner: Uuid, content: &[u8]) -> Uuid {
        let id = Uuid::new_v4();
        self.docs.lock().unwrap().insert(
            id,
            FakeDocument {
                owner,
                collaborators: HashSet::new(),
                content: content.to_vec(),
            },
        );
        id
    }

    pub fn add_collaborator(&self, document_id: Uuid, user: Uuid) {
        if let Some(doc) = self.docs.lock().unwrap().get_mut(&document_id) {
            doc.collaborators.insert(user);
        }
    }

    pub fn set_content(&self, document_id: Uuid, content: &[u8]) {
        if let Some(doc) = self.docs.lock().unwrap().get_mut(&document_id) {
            doc.content = content.to_vec();
        }
    }

    pub fn content_of(&self, document_id: Uuid) -> Option<Vec<u8>> {
        self.docs
            .lock()
            .unwrap()
            .get(&document_id)
            .map(|doc| doc.content.clone())
    }

    pub fn set_write_delay(&self, delay: Duration) {
        *self.write_delay.lock().unwrap() = delay;
    }

    fn seen(&self, ctx: &RequestContext) {
        self.credentials.lock().unwrap().push(credential_of(ctx));
    }

    fn lookup<T>(
        &self,
        document_id: Uuid,
        f: impl FnOnce(&FakeDocument) -> T,
    ) -> Result<T, ClientError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: 500,
                message: "boom".to_string(),
            });
        }
        let docs = self.docs.lock().unwrap();
        docs.get(&document_id).map(f).ok_or(ClientError::NotFound)
    }
}

#[async_trait]
impl ContentStore for FakeDocuments {
    async fn read_content(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> Result<Option<Vec<u8>>, ClientError> {
        self.seen(ctx);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ClientError::Timeout);
        }
        let docs = self.docs.lock().unwrap();
        let doc = docs.get(&document_id).ok_or(ClientError::NotFound)?;
        if doc.content.is_empty() {
            Ok(None)
        } else {
            Ok(Some(doc.content.clone()))
        }
    }

    async fn write_content(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        content: Vec<u8>,
    ) -> Result<(), ClientError> {
        self.seen(ctx);
        let delay = *self.write_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        {
            let mut docs = self.docs.lock().unwrap();
            let doc = docs.get_mut(&document_id).ok_or(ClientError::NotFound)?;
            doc.content = content;
        }
        self.events.record("write_done", document_id);
        Ok(())
    }
}

#[async_trait]
impl MembershipProvider for FakeDocuments {
    async fn get_owner(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> Result<Uuid, ClientError> {
        self.seen(ctx);
        self.lookup(document_id, |doc| doc.owner)
    }

    async fn get_collaborator_ids(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> Result<HashSet<Uuid>, ClientError> {
        self.seen(ctx);
        self.lookup(document_id, |doc| doc.collaborators.clone())
    }
}

pub struct FakeCollaboration {
    pub fail: AtomicBool,
    pub attempts: AtomicUsize,
    pub credentials: Mutex<Vec<Option<String>>>,
    events: EventLog,
}

impl FakeCollaboration {
    pub fn new(events: EventLog) -> Self {
        Self {
            fail: AtomicBool::new(false),
            attempts: AtomicUsize::new(0),
            credentials: Mutex::new(Vec::new()),
            events,
        }
    }
}

#[async_trait]
impl CollaborationLayer for FakeCollaboration {
    async fn notify_reload(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> Result<(), ClientError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.credentials.lock().unwrap().push(credential_of(ctx));
        self.events.record("notify", document_id);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeUsers {
    users: Mutex<HashMap<String, Uuid>>,
}

impl FakeUsers {
    pub fn add(&self, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.users.lock().unwrap().insert(username.to_string(), id);
        id
    }
}

#[async_trait]
impl UserDirectory for FakeUsers {
    async fn find_by_username(
        &self,
        _ctx: &RequestContext,
        username: &str,
    ) -> Result<Option<UserSummary>, ClientError> {
        let users = self.users.lock().unwrap();
        Ok(users.get(username).map(|id| UserSummary {
            id: *id,
            username: username.to_string(),
        }))
    }

    async fn resolve_usernames(
        &self,
        _ctx: &RequestContext,
        ids: &HashSet<Uuid>,
    ) -> HashMap<Uuid, String> {
        let users = self.users.lock().unwrap();
        users
            .iter()
            .filter(|(_, id)| ids.contains(id))
            .map(|(name, id)| (*id, name.clone()))
            .collect()
    }
}
