//! Thread-safe in-memory store implementations for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{ContentId, JobId},
	host::{ContentDraft, ContentRecord, ContentStore},
	store::{CacheKey, ResponseCache, SettingsStore, StoreError, StoreFuture},
};

/// In-process [`SettingsStore`] backend.
#[derive(Clone, Debug, Default)]
pub struct MemorySettings(Arc<RwLock<HashMap<String, String>>>);
impl SettingsStore for MemorySettings {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(key).cloned()) })
	}

	fn set<'a>(&'a self, key: &'a str, value: &'a str) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(key.to_owned(), value.to_owned());

			Ok(())
		})
	}

	fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().remove(key);

			Ok(())
		})
	}
}

type CacheMap = Arc<RwLock<HashMap<CacheKey, (JsonValue, OffsetDateTime)>>>;

/// In-process [`ResponseCache`] backend with TTL checked on read.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache(CacheMap);
impl MemoryCache {
	fn get_now(map: &CacheMap, key: &CacheKey) -> Option<JsonValue> {
		let now = OffsetDateTime::now_utc();
		let guard = map.read();
		let (value, expires_at) = guard.get(key)?;

		if *expires_at <= now {
			return None;
		}

		Some(value.clone())
	}
}
impl ResponseCache for MemoryCache {
	fn get<'a>(&'a self, key: &'a CacheKey) -> StoreFuture<'a, Option<JsonValue>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::get_now(&map, key)) })
	}

	fn set<'a>(
		&'a self,
		key: &'a CacheKey,
		value: &'a JsonValue,
		ttl: Duration,
	) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			let expires_at = OffsetDateTime::now_utc() + ttl;

			map.write().insert(key.clone(), (value.clone(), expires_at));

			Ok(())
		})
	}

	fn remove<'a>(&'a self, key: &'a CacheKey) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().remove(key);

			Ok(())
		})
	}

	fn flush(&self) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().clear();

			Ok(())
		})
	}
}

#[derive(Clone, Debug)]
struct ContentEntry {
	record: ContentRecord,
	job: Option<JobId>,
}

#[derive(Debug, Default)]
struct ContentState {
	entries: HashMap<ContentId, ContentEntry>,
	next_id: u64,
}

/// In-process [`ContentStore`] backend for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryContent(Arc<RwLock<ContentState>>);
impl MemoryContent {
	/// Seeds a record, optionally linked to a job, returning its identifier.
	pub fn insert_linked(&self, record: ContentRecord, job: Option<JobId>) -> ContentId {
		let id = record.id.clone();

		self.0.write().entries.insert(id.clone(), ContentEntry { record, job });

		id
	}

	/// Returns a snapshot of the stored record, if any.
	pub fn record(&self, id: &ContentId) -> Option<ContentRecord> {
		self.0.read().entries.get(id).map(|entry| entry.record.clone())
	}

	/// Returns the job linked to a record, if any.
	pub fn linked_job(&self, id: &ContentId) -> Option<JobId> {
		self.0.read().entries.get(id).and_then(|entry| entry.job.clone())
	}

	fn allocate_id(state: &mut ContentState) -> ContentId {
		state.next_id += 1;

		ContentId::new(format!("content-{}", state.next_id))
			.expect("Generated content identifiers are always valid.")
	}
}
impl ContentStore for MemoryContent {
	fn fetch<'a>(&'a self, id: &'a ContentId) -> StoreFuture<'a, Option<ContentRecord>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.read().entries.get(id).map(|entry| entry.record.clone())) })
	}

	fn save(&self, draft: ContentDraft) -> StoreFuture<'_, ContentId> {
		let state = self.0.clone();

		Box::pin(async move {
			let mut guard = state.write();

			match draft.id {
				Some(id) => {
					let entry = guard.entries.get_mut(&id).ok_or_else(|| StoreError::Backend {
						message: format!("unknown content record {id}"),
					})?;

					entry.record.title = draft.title;
					entry.record.body = draft.body;
					entry.record.status = draft.status;

					Ok(id)
				},
				None => {
					let id = Self::allocate_id(&mut guard);
					let record = ContentRecord {
						id: id.clone(),
						title: draft.title,
						body: draft.body,
						status: draft.status,
					};

					guard.entries.insert(id.clone(), ContentEntry { record, job: None });

					Ok(id)
				},
			}
		})
	}

	fn content_ids_for_jobs<'a>(
		&'a self,
		jobs: &'a [JobId],
	) -> StoreFuture<'a, HashMap<JobId, Vec<ContentId>>> {
		let state = self.0.clone();

		Box::pin(async move {
			let guard = state.read();
			let mut map: HashMap<JobId, Vec<ContentId>> = HashMap::new();

			for (id, entry) in &guard.entries {
				if let Some(job) = &entry.job
					&& jobs.contains(job)
				{
					map.entry(job.clone()).or_default().push(id.clone());
				}
			}

			// Deterministic first-match order for callers that take the head of the list.
			for ids in map.values_mut() {
				ids.sort();
			}

			Ok(map)
		})
	}

	fn job_for_content<'a>(&'a self, id: &'a ContentId) -> StoreFuture<'a, Option<JobId>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.read().entries.get(id).and_then(|entry| entry.job.clone())) })
	}

	fn link_job<'a>(&'a self, id: &'a ContentId, job: &'a JobId) -> StoreFuture<'a, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			let mut guard = state.write();
			let entry = guard.entries.get_mut(id).ok_or_else(|| StoreError::Backend {
				message: format!("unknown content record {id}"),
			})?;

			entry.job = Some(job.clone());

			Ok(())
		})
	}

	fn permalink<'a>(&'a self, id: &'a ContentId) -> StoreFuture<'a, Option<String>> {
		let state = self.0.clone();

		Box::pin(async move {
			let known = state.read().entries.contains_key(id);

			Ok(known.then(|| format!("https://host.example/{id}")))
		})
	}

	fn edit_url<'a>(&'a self, id: &'a ContentId) -> StoreFuture<'a, String> {
		Box::pin(async move { Ok(format!("https://host.example/edit.php?action=edit&content={id}")) })
	}
}
