//! Abstraction of interval based sorted set queries
//!
//! [ZCOUNT](<https://redis.io/commands/zcount/>), [ZRANGEBYSCORE](<https://redis.io/commands/zrangebyscore/>),
//! [ZLEXCOUNT](<https://redis.io/commands/zlexcount/>) and [ZRANGEBYLEX](<https://redis.io/commands/zrangebylex/>)
//! take their range as [Interval].
//!
//! # Scores
//! ```
//! use resp_pipeline::commands::interval::{BoundType, Interval};
//! use resp_pipeline::commands::zrange::ZRangeByScoreCommand;
//! use resp_pipeline::commands::Command;
//! use resp_pipeline::value::ReplyValue;
//!
//! let interval = Interval::right_bounded(100.0, BoundType::Open).unwrap();
//! let command = ZRangeByScoreCommand::new("ranking", interval).with_scores().limit(0, 10);
//!
//! // ZRANGEBYSCORE ranking -inf (100 WITHSCORES LIMIT 0 10
//! assert_eq!(7, command.encode().argument_count());
//!
//! let reply = ReplyValue::Array(vec![ReplyValue::bulk("alice"), ReplyValue::bulk("-inf")]);
//! let members = command.eval_response(reply).unwrap();
//! assert_eq!(Some(f64::NEG_INFINITY), members[0].score);
//! ```
//! # Lexicographic
//! ```
//! use resp_pipeline::commands::interval::{BoundType, Interval};
//! use resp_pipeline::commands::zrange::ZLexCountCommand;
//! use resp_pipeline::commands::Command;
//! use resp_pipeline::value::ReplyValue;
//!
//! let interval = Interval::bounded("a", "f", BoundType::RightOpen).unwrap();
//! let command = ZLexCountCommand::new("names", interval);
//!
//! assert_eq!(3, command.eval_response(ReplyValue::Integer(3)).unwrap());
//! ```
use crate::commands::builder::CommandBuilder;
use crate::commands::interval::{Interval, LexBound, ScoreBound};
use crate::commands::Command;
use crate::network::{Client, CommandErrors, Future, Protocol, Transport};
use crate::value::{FromReply, ReplyValue, TypeMismatch};
use alloc::vec::Vec;
use bytes::Bytes;
use embedded_time::Clock;

/// Member of a sorted set. Score is only present if requested by WITHSCORES.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    pub member: Bytes,
    pub score: Option<f64>,
}

/// LIMIT option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Limit {
    offset: i64,
    count: i64,
}

impl Limit {
    fn apply(limit: Option<Limit>, builder: CommandBuilder) -> CommandBuilder {
        match limit {
            Some(limit) => builder.arg_static("LIMIT").arg_int(limit.offset).arg_int(limit.count),
            None => builder,
        }
    }
}

/// Abstraction of ZCOUNT command
#[derive(Debug, Clone)]
pub struct ZCountCommand<T: ScoreBound> {
    key: Bytes,
    interval: Interval<T>,
}

impl<T: ScoreBound> ZCountCommand<T> {
    pub fn new<K>(key: K, interval: Interval<T>) -> Self
    where
        Bytes: From<K>,
    {
        Self {
            key: key.into(),
            interval,
        }
    }
}

impl<T: ScoreBound> Command for ZCountCommand<T> {
    /// Number of members within the interval
    type Response = usize;

    fn encode(&self) -> CommandBuilder {
        CommandBuilder::new("ZCOUNT")
            .arg(&self.key)
            .arg(self.interval.min())
            .arg(self.interval.max())
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        usize::from_reply(reply)
    }
}

/// Abstraction of ZRANGEBYSCORE command
#[derive(Debug, Clone)]
pub struct ZRangeByScoreCommand<T: ScoreBound> {
    key: Bytes,
    interval: Interval<T>,
    with_scores: bool,
    limit: Option<Limit>,
}

impl<T: ScoreBound> ZRangeByScoreCommand<T> {
    pub fn new<K>(key: K, interval: Interval<T>) -> Self
    where
        Bytes: From<K>,
    {
        Self {
            key: key.into(),
            interval,
            with_scores: false,
            limit: None,
        }
    }

    /// Returns the scores together with the members (WITHSCORES option)
    pub fn with_scores(mut self) -> Self {
        self.with_scores = true;
        self
    }

    /// Skips `offset` members and returns at most `count` members. Negative count returns all
    /// remaining members.
    pub fn limit(mut self, offset: i64, count: i64) -> Self {
        self.limit = Some(Limit { offset, count });
        self
    }
}

impl<T: ScoreBound> Command for ZRangeByScoreCommand<T> {
    type Response = Vec<ScoredMember>;

    fn encode(&self) -> CommandBuilder {
        let builder = CommandBuilder::new("ZRANGEBYSCORE")
            .arg(&self.key)
            .arg(self.interval.min())
            .arg(self.interval.max())
            .arg_static_option(self.with_scores.then_some("WITHSCORES"));

        Limit::apply(self.limit, builder)
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        if !self.with_scores {
            let members: Vec<Bytes> = Vec::from_reply(reply)?;
            return Ok(members
                .into_iter()
                .map(|member| ScoredMember { member, score: None })
                .collect());
        }

        let elements: Vec<ReplyValue> = Vec::from_reply(reply)?;

        // RESP3 nests each member/score pair, RESP2 returns a flat list
        if elements.iter().all(|element| matches!(element, ReplyValue::Array(_))) {
            return elements
                .into_iter()
                .map(|pair| {
                    let (member, score) = <(Bytes, f64)>::from_reply(pair)?;
                    Ok(ScoredMember {
                        member,
                        score: Some(score),
                    })
                })
                .collect();
        }

        if elements.len() % 2 != 0 {
            return Err(TypeMismatch {
                expected: "member/score pairs",
                found: "array of odd length",
            });
        }

        let mut members = Vec::with_capacity(elements.len() / 2);
        let mut elements = elements.into_iter();
        while let (Some(member), Some(score)) = (elements.next(), elements.next()) {
            members.push(ScoredMember {
                member: Bytes::from_reply(member)?,
                score: Some(f64::from_reply(score)?),
            });
        }

        Ok(members)
    }
}

/// Abstraction of ZLEXCOUNT command
#[derive(Debug, Clone)]
pub struct ZLexCountCommand<T: LexBound> {
    key: Bytes,
    interval: Interval<T>,
}

impl<T: LexBound> ZLexCountCommand<T> {
    pub fn new<K>(key: K, interval: Interval<T>) -> Self
    where
        Bytes: From<K>,
    {
        Self {
            key: key.into(),
            interval,
        }
    }
}

impl<T: LexBound> Command for ZLexCountCommand<T> {
    /// Number of members within the interval
    type Response = usize;

    fn encode(&self) -> CommandBuilder {
        CommandBuilder::new("ZLEXCOUNT")
            .arg(&self.key)
            .arg(self.interval.min())
            .arg(self.interval.max())
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        usize::from_reply(reply)
    }
}

/// Abstraction of ZRANGEBYLEX command
#[derive(Debug, Clone)]
pub struct ZRangeByLexCommand<T: LexBound> {
    key: Bytes,
    interval: Interval<T>,
    limit: Option<Limit>,
}

impl<T: LexBound> ZRangeByLexCommand<T> {
    pub fn new<K>(key: K, interval: Interval<T>) -> Self
    where
        Bytes: From<K>,
    {
        Self {
            key: key.into(),
            interval,
            limit: None,
        }
    }

    /// Skips `offset` members and returns at most `count` members
    pub fn limit(mut self, offset: i64, count: i64) -> Self {
        self.limit = Some(Limit { offset, count });
        self
    }
}

impl<T: LexBound> Command for ZRangeByLexCommand<T> {
    type Response = Vec<Bytes>;

    fn encode(&self) -> CommandBuilder {
        let builder = CommandBuilder::new("ZRANGEBYLEX")
            .arg(&self.key)
            .arg(self.interval.min())
            .arg(self.interval.max());

        Limit::apply(self.limit, builder)
    }

    fn eval_response(&self, reply: ReplyValue) -> Result<Self::Response, TypeMismatch> {
        Vec::from_reply(reply)
    }
}

impl<T: Transport, C: Clock, P: Protocol> Client<'_, T, C, P> {
    /// Shorthand for [ZCountCommand]
    pub fn zcount<K, B>(
        &self,
        key: K,
        interval: Interval<B>,
    ) -> Result<Future<'_, T, C, P, ZCountCommand<B>>, CommandErrors>
    where
        Bytes: From<K>,
        B: ScoreBound,
    {
        self.send(ZCountCommand::new(key, interval))
    }

    /// Shorthand for [ZLexCountCommand]
    pub fn zlexcount<K, B>(
        &self,
        key: K,
        interval: Interval<B>,
    ) -> Result<Future<'_, T, C, P, ZLexCountCommand<B>>, CommandErrors>
    where
        Bytes: From<K>,
        B: LexBound,
    {
        self.send(ZLexCountCommand::new(key, interval))
    }
}
