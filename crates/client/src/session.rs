//! Session lifecycle.
//!
//! A [`Session`] is created at startup, holds the current identity and the
//! guest flag, and exposes the single [`Role`] derived from them. The role
//! is recomputed on every identity change and never stored elsewhere.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::TryRecvError};

use folio_core::backend::{AuthEvent, Credentials, IdentityProvider};
use folio_core::roles::{self, Identity, OwnerPolicy, Role};

use crate::error::ClientResult;
use crate::guest::GuestFlagStore;

pub struct Session {
    identity: Option<Identity>,
    guest_mode: bool,
    role: Role,
    policy: OwnerPolicy,
    auth: Arc<dyn IdentityProvider>,
    guest_store: Arc<dyn GuestFlagStore>,
    events: broadcast::Receiver<AuthEvent>,
}

impl Session {
    /// Build the session from persisted state.
    ///
    /// A backend identity overrides a stored guest flag and clears it. A
    /// failed lookup degrades to `Anonymous`.
    pub async fn start(
        auth: Arc<dyn IdentityProvider>,
        guest_store: Arc<dyn GuestFlagStore>,
        policy: OwnerPolicy,
    ) -> ClientResult<Self> {
        let mut guest_mode = guest_store.load()?;
        let identity = match auth.current_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "Identity lookup failed, continuing anonymously");
                None
            }
        };
        if guest_mode && identity.is_some() {
            guest_store.store(false)?;
            guest_mode = false;
        }

        let events = auth.subscribe();
        let mut session = Self {
            identity,
            guest_mode,
            role: Role::Anonymous,
            policy,
            auth,
            guest_store,
            events,
        };
        session.recompute();
        tracing::info!(role = %session.role, "Session started");
        Ok(session)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_guest(&self) -> bool {
        self.guest_mode
    }

    pub fn display_name(&self) -> String {
        roles::display_name(self.identity.as_ref(), self.guest_mode)
    }

    pub fn policy(&self) -> &OwnerPolicy {
        &self.policy
    }

    fn recompute(&mut self) -> Role {
        let previous = self.role;
        self.role = roles::resolve_role(self.identity.as_ref(), self.guest_mode, &self.policy);
        if previous != self.role {
            tracing::debug!(from = %previous, to = %self.role, "Role changed");
        }
        self.role
    }

    /// Browse as a guest without an account. The flag persists until
    /// sign-in, sign-out or [`exit_guest`](Self::exit_guest).
    pub fn enter_guest(&mut self) -> ClientResult<Role> {
        self.guest_store.store(true)?;
        self.guest_mode = true;
        tracing::info!("Entered guest mode");
        Ok(self.recompute())
    }

    pub fn exit_guest(&mut self) -> ClientResult<Role> {
        self.guest_store.store(false)?;
        self.guest_mode = false;
        Ok(self.recompute())
    }

    /// Password sign-in. Always overrides guest mode.
    pub async fn sign_in(&mut self, credentials: &Credentials) -> ClientResult<Role> {
        let identity = self.auth.sign_in(credentials).await?;
        self.apply_event(AuthEvent::SignedIn(identity))
    }

    /// Register an account. Returns the new role when the provider signs
    /// the user in immediately, `None` while confirmation is pending.
    pub async fn sign_up(&mut self, credentials: &Credentials) -> ClientResult<Option<Role>> {
        match self.auth.sign_up(credentials).await? {
            Some(identity) => self.apply_event(AuthEvent::SignedIn(identity)).map(Some),
            None => Ok(None),
        }
    }

    /// Request a passwordless sign-in link. The identity is unchanged until
    /// the link is followed.
    pub async fn send_magic_link(&self, email: &str) -> ClientResult<()> {
        self.auth.send_magic_link(email.trim()).await?;
        Ok(())
    }

    /// Tear down all local role state. Local state is cleared even when
    /// the provider call fails; the failure is still returned.
    pub async fn sign_out(&mut self) -> ClientResult<Role> {
        let remote = self.auth.sign_out().await;
        let role = self.apply_event(AuthEvent::SignedOut)?;
        remote?;
        Ok(role)
    }

    /// Apply an identity change. Sign-in clears the guest flag; sign-out
    /// clears everything.
    pub fn apply_event(&mut self, event: AuthEvent) -> ClientResult<Role> {
        match event {
            AuthEvent::SignedIn(identity) => {
                self.identity = Some(identity);
            }
            AuthEvent::SignedOut => {
                self.identity = None;
            }
        }
        self.guest_mode = false;
        // Role follows the identity even when the flag cannot be cleared.
        let stored = self.guest_store.store(false);
        let role = self.recompute();
        stored.map(|_| role)
    }

    /// Apply identity changes announced by the provider since the last
    /// call. Returns `true` when the role changed.
    pub fn sync_events(&mut self) -> ClientResult<bool> {
        let before = self.role;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.apply_event(event)?;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Missed auth events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        Ok(before != self.role)
    }

    /// Re-read the identity from the provider. A failed lookup drops the
    /// identity before the error is returned.
    pub async fn refresh(&mut self) -> ClientResult<Role> {
        match self.auth.current_identity().await {
            Ok(identity) => {
                self.identity = identity;
                Ok(self.recompute())
            }
            Err(e) => {
                self.identity = None;
                self.recompute();
                Err(e.into())
            }
        }
    }

    /// Fresh receiver for identity change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth.subscribe()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("guest_mode", &self.guest_mode)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}
