use crate::commands::hello::HelloResponse;
use crate::network::client::{Client, CommandErrors};
use crate::network::parser::ParserLimits;
use crate::network::pipeline::Session;
use crate::network::protocol::{Protocol, Resp2, Resp3};
use crate::network::transport::NalTransport;
use alloc::string::{String, ToString};
use core::net::SocketAddr;
use embedded_nal::TcpClientStack;
use embedded_time::duration::Extensions;
use embedded_time::duration::Microseconds;
use embedded_time::Clock;
use tracing::{debug, warn};

/// Error handling for connection management
#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum ConnectionError {
    /// Unable to get a socket from network layer
    #[error("no socket available")]
    TcpSocketError,

    /// TCP Connect failed
    #[error("TCP connect failed")]
    TcpConnectionFailed,

    /// Authentication failed with the given sub error
    #[error("authentication failed: {0}")]
    AuthenticationError(CommandErrors),

    /// Protocol switch (switch to RESP3) failed with the given sub error
    #[error("protocol switch failed: {0}")]
    ProtocolSwitchError(CommandErrors),

    /// SELECT of the configured database failed with the given sub error
    #[error("database selection failed: {0}")]
    DatabaseSelectError(CommandErrors),
}

/// Authentication credentials
#[derive(Clone)]
pub struct Credentials {
    pub(crate) username: Option<String>,
    pub(crate) password: String,
}

impl Credentials {
    /// Uses ACL based authentication
    /// Required Redis version >= 6 + ACL enabled
    pub fn acl(username: &str, password: &str) -> Self {
        Credentials {
            username: Some(username.to_string()),
            password: password.to_string(),
        }
    }

    /// Uses password-only authentication.
    /// This form just authenticates against the password set with requirepass (Redis server conf)
    pub fn password_only(password: &str) -> Self {
        Self {
            username: None,
            password: password.to_string(),
        }
    }
}

/// Client type created by [ConnectionHandler]
pub type NalClient<'a, N, C, P> = Client<'a, NalTransport<'a, N>, C, P>;

/// Trait for Redis connection handler.
///
/// Exists mainly to facilitate use in other crates, especially in relation to unit tests.
pub trait RedisConnectionHandler<N: TcpClientStack, P: Protocol> {
    /// See [ConnectionHandler#method.connect]
    fn connect<'a, C: Clock>(
        &'a mut self,
        network: &'a mut N,
        clock: Option<&'a C>,
    ) -> Result<NalClient<'a, N, C, P>, ConnectionError>;

    /// See [ConnectionHandler#method.disconnect]
    fn disconnect(&mut self, network: &mut N);

    /// See [ConnectionHandler#method.timeout]
    fn timeout(&mut self, timeout: Microseconds) -> &mut Self;

    /// See [ConnectionHandler#method.auth]
    fn auth(&mut self, credentials: Credentials) -> &mut Self;
}

/// Connection handler for Redis client
///
/// While the Client is not Send, the connection handler is.
/// The handler is designed with the approach that the creation of new clients is cheap.
/// Thus, the use of short-lived clients in concurrent applications is not a problem.
///
/// Socket and connection state (pending requests, transaction, subscriptions) are cached, so all
/// clients created for one connection share the same reply queue.
pub struct ConnectionHandler<N: TcpClientStack, P: Protocol> {
    /// Network details of Redis server
    remote: SocketAddr,

    /// Authentication credentials. None in case of no authentication.
    authentication: Option<Credentials>,

    /// Database selected after authentication
    database: Option<usize>,

    /// Cached socket
    socket: Option<N::TcpSocket>,

    /// State of the cached connection
    session: Option<Session>,

    /// Previous initialization failed, so socket gets closed on next connect()
    init_failed: bool,

    /// Optional timeout
    /// Max. duration waiting for Redis responses
    timeout: Microseconds,

    /// Cached socket is tested by PING before reuse
    use_ping: bool,

    limits: ParserLimits,

    /// Redis protocol
    /// RESP3 requires Redis version >= 6.0
    protocol: P,

    /// Response to HELLO command, only used for RESP3
    pub(crate) hello_response: Option<HelloResponse>,
}

impl<N: TcpClientStack> ConnectionHandler<N, Resp2> {
    /// Creates a new connection handler using RESP2 protocol
    pub fn resp2(remote: SocketAddr) -> ConnectionHandler<N, Resp2> {
        ConnectionHandler::new(remote, Resp2 {})
    }
}

impl<N: TcpClientStack> ConnectionHandler<N, Resp3> {
    /// Creates a new connection handler using RESP3 protocol
    pub fn resp3(remote: SocketAddr) -> ConnectionHandler<N, Resp3> {
        ConnectionHandler::new(remote, Resp3 {})
    }
}

impl<N: TcpClientStack, P: Protocol> RedisConnectionHandler<N, P> for ConnectionHandler<N, P> {
    /// Returns a Redis client. Caches the connection for future reuse.
    /// The client has the same lifetime as the network reference.
    ///
    /// As the connection is cached, later calls are cheap.
    /// So a new client may be created when switching threads, RISC tasks, etc.
    ///
    /// *Initialization*
    /// AUTH, HELLO (RESP3 only) and SELECT are executed automatically when creating a new
    /// connection. So the caller can expect an already authenticated and ready to use client.
    ///
    /// # Arguments
    ///
    /// * `network`: Mutable borrow of embedded-nal network stack
    /// * `clock`: Borrow of embedded-time clock
    fn connect<'a, C: Clock>(
        &'a mut self,
        network: &'a mut N,
        clock: Option<&'a C>,
    ) -> Result<NalClient<'a, N, C, P>, ConnectionError> {
        // Previous socket is maybe faulty, so we are closing it here
        if self.init_failed || self.session.as_ref().is_some_and(Session::is_closed) {
            self.disconnect(network);
        }

        if self.use_ping && self.socket.is_some() {
            self.ping_socket(network, clock);
        }

        // Reuse existing connection
        if self.socket.is_some() {
            return self.create_client(network, clock);
        }

        self.new_client(network, clock)
    }

    /// Disconnects the connection
    ///
    /// Requests still pending are completed with [CommandErrors::ConnectionClosed].
    fn disconnect(&mut self, network: &mut N) {
        if let Some(session) = self.session.take() {
            session.pipeline_mut().on_closed();
            session.deliver();
        }

        if let Some(socket) = self.socket.take() {
            debug!("Closing socket");
            let _ = network.close(socket);
        }

        self.init_failed = false;
        self.hello_response = None;
    }

    /// Sets the max. duration waiting for Redis responses
    fn timeout(&mut self, timeout: Microseconds) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Sets the authentication credentials
    fn auth(&mut self, credentials: Credentials) -> &mut Self {
        self.authentication = Some(credentials);
        self
    }
}

impl<N: TcpClientStack, P: Protocol> ConnectionHandler<N, P> {
    fn new(remote: SocketAddr, protocol: P) -> Self {
        ConnectionHandler {
            remote,
            authentication: None,
            database: None,
            socket: None,
            session: None,
            init_failed: false,
            timeout: 0.microseconds(),
            use_ping: false,
            limits: ParserLimits::default(),
            protocol,
            hello_response: None,
        }
    }

    /// Selects the given database on every new connection
    pub fn database(&mut self, index: usize) -> &mut Self {
        self.database = Some(index);
        self
    }

    /// Tests the cached connection by PING before reusing it. Increases reliability, but costs a
    /// round trip on every connect().
    pub fn use_ping(&mut self) -> &mut Self {
        self.use_ping = true;
        self
    }

    /// Sets the reply size and nesting limits of new connections
    pub fn limits(&mut self, limits: ParserLimits) -> &mut Self {
        self.limits = limits;
        self
    }

    /// Creates and initializes a new client
    fn new_client<'a, C: Clock>(
        &'a mut self,
        network: &'a mut N,
        clock: Option<&'a C>,
    ) -> Result<NalClient<'a, N, C, P>, ConnectionError> {
        self.connect_socket(network)?;
        self.session = Some(Session::new(self.limits));

        let credentials = self.authentication.clone();
        let database = self.database;
        let result = self.create_client(network, clock)?.init(credentials, database);

        match result {
            Ok(response) => {
                self.hello_response = response;
                self.create_client(network, clock)
            }
            Err(error) => {
                warn!(%error, "Connection initialization failed");
                self.init_failed = true;
                Err(error)
            }
        }
    }

    /// Sends a PING on the cached connection and drops it if there is no valid reply
    fn ping_socket<C: Clock>(&mut self, network: &mut N, clock: Option<&C>) {
        let alive = match self.create_client(network, clock) {
            Ok(client) => client.ping().and_then(|future| future.wait()).is_ok(),
            Err(_) => false,
        };

        if !alive {
            warn!("Cached connection did not answer PING");
            self.disconnect(network);
        }
    }

    /// Creates a new TCP connection
    fn connect_socket(&mut self, network: &mut N) -> Result<(), ConnectionError> {
        let mut socket = network.socket().map_err(|_| ConnectionError::TcpSocketError)?;

        if nb::block!(network.connect(&mut socket, self.remote)).is_err() {
            let _ = network.close(socket);
            return Err(ConnectionError::TcpConnectionFailed);
        };

        debug!(remote = %self.remote, "Connected");
        self.socket = Some(socket);
        Ok(())
    }

    /// Creates a new client instance on the cached connection
    fn create_client<'a, C: Clock>(
        &'a mut self,
        stack: &'a mut N,
        clock: Option<&'a C>,
    ) -> Result<NalClient<'a, N, C, P>, ConnectionError> {
        let socket = self.socket.as_mut().ok_or(ConnectionError::TcpSocketError)?;
        let session = self.session.as_ref().ok_or(ConnectionError::TcpSocketError)?;

        Ok(Client {
            transport: core::cell::RefCell::new(NalTransport::new(stack, socket)),
            session,
            clock,
            timeout_duration: self.timeout,
            protocol: self.protocol.clone(),
            hello_response: self.hello_response.as_ref(),
        })
    }
}
