//! OTLP protobuf message set.
//!
//! Hand-written prost structs for the subset of OTLP this engine touches,
//! laid out in the same module tree a protoc build would emit. Field
//! numbers and scalar wire types match the upstream definitions; enum-typed
//! wire fields are carried as `i32` and mapped to canonical enums in
//! [`crate::ingest::decode`].

#![allow(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod common {
    //! Common OTLP types.
    pub mod v1 {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct AnyValue {
            #[prost(oneof = "any_value::Value", tags = "1, 2, 3, 4, 5, 6, 7")]
            pub value: ::core::option::Option<any_value::Value>,
        }

        pub mod any_value {
            #[derive(Clone, PartialEq, ::prost::Oneof)]
            pub enum Value {
                #[prost(string, tag = "1")]
                StringValue(::prost::alloc::string::String),
                #[prost(bool, tag = "2")]
                BoolValue(bool),
                #[prost(int64, tag = "3")]
                IntValue(i64),
                #[prost(double, tag = "4")]
                DoubleValue(f64),
                #[prost(message, tag = "5")]
                ArrayValue(super::ArrayValue),
                #[prost(message, tag = "6")]
                KvlistValue(super::KeyValueList),
                #[prost(bytes, tag = "7")]
                BytesValue(::prost::alloc::vec::Vec<u8>),
            }
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ArrayValue {
            #[prost(message, repeated, tag = "1")]
            pub values: ::prost::alloc::vec::Vec<AnyValue>,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct KeyValueList {
            #[prost(message, repeated, tag = "1")]
            pub values: ::prost::alloc::vec::Vec<KeyValue>,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct KeyValue {
            #[prost(string, tag = "1")]
            pub key: ::prost::alloc::string::String,
            #[prost(message, optional, tag = "2")]
            pub value: ::core::option::Option<AnyValue>,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct InstrumentationScope {
            #[prost(string, tag = "1")]
            pub name: ::prost::alloc::string::String,
            #[prost(string, tag = "2")]
            pub version: ::prost::alloc::string::String,
            #[prost(message, repeated, tag = "3")]
            pub attributes: ::prost::alloc::vec::Vec<KeyValue>,
            #[prost(uint32, tag = "4")]
            pub dropped_attributes_count: u32,
        }
    }
}

pub mod resource {
    //! Resource types.
    pub mod v1 {
        use super::super::common;

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Resource {
            #[prost(message, repeated, tag = "1")]
            pub attributes: ::prost::alloc::vec::Vec<common::v1::KeyValue>,
            #[prost(uint32, tag = "2")]
            pub dropped_attributes_count: u32,
        }
    }
}

pub mod trace {
    //! Trace types.
    pub mod v1 {
        use super::super::{common, resource};

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ResourceSpans {
            #[prost(message, optional, tag = "1")]
            pub resource: ::core::option::Option<resource::v1::Resource>,
            #[prost(message, repeated, tag = "2")]
            pub scope_spans: ::prost::alloc::vec::Vec<ScopeSpans>,
            #[prost(string, tag = "3")]
            pub schema_url: ::prost::alloc::string::String,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ScopeSpans {
            #[prost(message, optional, tag = "1")]
            pub scope: ::core::option::Option<common::v1::InstrumentationScope>,
            #[prost(message, repeated, tag = "2")]
            pub spans: ::prost::alloc::vec::Vec<Span>,
            #[prost(string, tag = "3")]
            pub schema_url: ::prost::alloc::string::String,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Span {
            #[prost(bytes = "vec", tag = "1")]
            pub trace_id: ::prost::alloc::vec::Vec<u8>,
            #[prost(bytes = "vec", tag = "2")]
            pub span_id: ::prost::alloc::vec::Vec<u8>,
            #[prost(string, tag = "3")]
            pub trace_state: ::prost::alloc::string::String,
            #[prost(bytes = "vec", tag = "4")]
            pub parent_span_id: ::prost::alloc::vec::Vec<u8>,
            #[prost(string, tag = "5")]
            pub name: ::prost::alloc::string::String,
            /// SpanKind enum on the wire.
            #[prost(int32, tag = "6")]
            pub kind: i32,
            #[prost(fixed64, tag = "7")]
            pub start_time_unix_nano: u64,
            #[prost(fixed64, tag = "8")]
            pub end_time_unix_nano: u64,
            #[prost(message, repeated, tag = "9")]
            pub attributes: ::prost::alloc::vec::Vec<common::v1::KeyValue>,
            #[prost(uint32, tag = "10")]
            pub dropped_attributes_count: u32,
            #[prost(message, repeated, tag = "11")]
            pub events: ::prost::alloc::vec::Vec<span::Event>,
            #[prost(uint32, tag = "12")]
            pub dropped_events_count: u32,
            #[prost(message, repeated, tag = "13")]
            pub links: ::prost::alloc::vec::Vec<span::Link>,
            #[prost(uint32, tag = "14")]
            pub dropped_links_count: u32,
            #[prost(message, optional, tag = "15")]
            pub status: ::core::option::Option<Status>,
        }

        pub mod span {
            use super::super::super::common;

            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct Event {
                #[prost(fixed64, tag = "1")]
                pub time_unix_nano: u64,
                #[prost(string, tag = "2")]
                pub name: ::prost::alloc::string::String,
                #[prost(message, repeated, tag = "3")]
                pub attributes: ::prost::alloc::vec::Vec<common::v1::KeyValue>,
                #[prost(uint32, tag = "4")]
                pub dropped_attributes_count: u32,
            }

            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct Link {
                #[prost(bytes = "vec", tag = "1")]
                pub trace_id: ::prost::alloc::vec::Vec<u8>,
                #[prost(bytes = "vec", tag = "2")]
                pub span_id: ::prost::alloc::vec::Vec<u8>,
                #[prost(string, tag = "3")]
                pub trace_state: ::prost::alloc::string::String,
                #[prost(message, repeated, tag = "4")]
                pub attributes: ::prost::alloc::vec::Vec<common::v1::KeyValue>,
                #[prost(uint32, tag = "5")]
                pub dropped_attributes_count: u32,
            }

            /// Wire values of the SpanKind enum.
            pub mod span_kind {
                pub const UNSPECIFIED: i32 = 0;
                pub const INTERNAL: i32 = 1;
                pub const SERVER: i32 = 2;
                pub const CLIENT: i32 = 3;
                pub const PRODUCER: i32 = 4;
                pub const CONSUMER: i32 = 5;
            }
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Status {
            #[prost(string, tag = "2")]
            pub message: ::prost::alloc::string::String,
            /// StatusCode enum on the wire: 0 unset, 1 ok, 2 error.
            #[prost(int32, tag = "3")]
            pub code: i32,
        }
    }
}

pub mod logs {
    //! Log types.
    pub mod v1 {
        use super::super::{common, resource};

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ResourceLogs {
            #[prost(message, optional, tag = "1")]
            pub resource: ::core::option::Option<resource::v1::Resource>,
            #[prost(message, repeated, tag = "2")]
            pub scope_logs: ::prost::alloc::vec::Vec<ScopeLogs>,
            #[prost(string, tag = "3")]
            pub schema_url: ::prost::alloc::string::String,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ScopeLogs {
            #[prost(message, optional, tag = "1")]
            pub scope: ::core::option::Option<common::v1::InstrumentationScope>,
            #[prost(message, repeated, tag = "2")]
            pub log_records: ::prost::alloc::vec::Vec<LogRecord>,
            #[prost(string, tag = "3")]
            pub schema_url: ::prost::alloc::string::String,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct LogRecord {
            #[prost(fixed64, tag = "1")]
            pub time_unix_nano: u64,
            /// SeverityNumber enum on the wire.
            #[prost(int32, tag = "2")]
            pub severity_number: i32,
            #[prost(string, tag = "3")]
            pub severity_text: ::prost::alloc::string::String,
            #[prost(message, optional, tag = "5")]
            pub body: ::core::option::Option<common::v1::AnyValue>,
            #[prost(message, repeated, tag = "6")]
            pub attributes: ::prost::alloc::vec::Vec<common::v1::KeyValue>,
            #[prost(uint32, tag = "7")]
            pub dropped_attributes_count: u32,
            #[prost(fixed32, tag = "8")]
            pub flags: u32,
            #[prost(bytes = "vec", tag = "9")]
            pub trace_id: ::prost::alloc::vec::Vec<u8>,
            #[prost(bytes = "vec", tag = "10")]
            pub span_id: ::prost::alloc::vec::Vec<u8>,
            #[prost(fixed64, tag = "11")]
            pub observed_time_unix_nano: u64,
        }
    }
}

pub mod metrics {
    //! Metric types.
    pub mod v1 {
        use super::super::{common, resource};

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ResourceMetrics {
            #[prost(message, optional, tag = "1")]
            pub resource: ::core::option::Option<resource::v1::Resource>,
            #[prost(message, repeated, tag = "2")]
            pub scope_metrics: ::prost::alloc::vec::Vec<ScopeMetrics>,
            #[prost(string, tag = "3")]
            pub schema_url: ::prost::alloc::string::String,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ScopeMetrics {
            #[prost(message, optional, tag = "1")]
            pub scope: ::core::option::Option<common::v1::InstrumentationScope>,
            #[prost(message, repeated, tag = "2")]
            pub metrics: ::prost::alloc::vec::Vec<Metric>,
            #[prost(string, tag = "3")]
            pub schema_url: ::prost::alloc::string::String,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Metric {
            #[prost(string, tag = "1")]
            pub name: ::prost::alloc::string::String,
            #[prost(string, tag = "2")]
            pub description: ::prost::alloc::string::String,
            #[prost(string, tag = "3")]
            pub unit: ::prost::alloc::string::String,
            #[prost(oneof = "metric::Data", tags = "5, 7, 9, 10, 11")]
            pub data: ::core::option::Option<metric::Data>,
        }

        pub mod metric {
            #[derive(Clone, PartialEq, ::prost::Oneof)]
            pub enum Data {
                #[prost(message, tag = "5")]
                Gauge(super::Gauge),
                #[prost(message, tag = "7")]
                Sum(super::Sum),
                #[prost(message, tag = "9")]
                Histogram(super::Histogram),
                #[prost(message, tag = "10")]
                ExponentialHistogram(super::ExponentialHistogram),
                #[prost(message, tag = "11")]
                Summary(super::Summary),
            }
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Gauge {
            #[prost(message, repeated, tag = "1")]
            pub data_points: ::prost::alloc::vec::Vec<NumberDataPoint>,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Sum {
            #[prost(message, repeated, tag = "1")]
            pub data_points: ::prost::alloc::vec::Vec<NumberDataPoint>,
            #[prost(int32, tag = "2")]
            pub aggregation_temporality: i32,
            #[prost(bool, tag = "3")]
            pub is_monotonic: bool,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Histogram {
            #[prost(message, repeated, tag = "1")]
            pub data_points: ::prost::alloc::vec::Vec<HistogramDataPoint>,
            #[prost(int32, tag = "2")]
            pub aggregation_temporality: i32,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ExponentialHistogram {
            #[prost(message, repeated, tag = "1")]
            pub data_points: ::prost::alloc::vec::Vec<ExponentialHistogramDataPoint>,
            #[prost(int32, tag = "2")]
            pub aggregation_temporality: i32,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Summary {
            #[prost(message, repeated, tag = "1")]
            pub data_points: ::prost::alloc::vec::Vec<SummaryDataPoint>,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct NumberDataPoint {
            #[prost(message, repeated, tag = "7")]
            pub attributes: ::prost::alloc::vec::Vec<common::v1::KeyValue>,
            #[prost(fixed64, tag = "2")]
            pub start_time_unix_nano: u64,
            #[prost(fixed64, tag = "3")]
            pub time_unix_nano: u64,
            #[prost(message, repeated, tag = "5")]
            pub exemplars: ::prost::alloc::vec::Vec<Exemplar>,
            #[prost(uint32, tag = "8")]
            pub flags: u32,
            #[prost(oneof = "number_data_point::Value", tags = "4, 6")]
            pub value: ::core::option::Option<number_data_point::Value>,
        }

        pub mod number_data_point {
            #[derive(Clone, PartialEq, ::prost::Oneof)]
            pub enum Value {
                #[prost(double, tag = "4")]
                AsDouble(f64),
                #[prost(sfixed64, tag = "6")]
                AsInt(i64),
            }
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct HistogramDataPoint {
            #[prost(message, repeated, tag = "9")]
            pub attributes: ::prost::alloc::vec::Vec<common::v1::KeyValue>,
            #[prost(fixed64, tag = "2")]
            pub start_time_unix_nano: u64,
            #[prost(fixed64, tag = "3")]
            pub time_unix_nano: u64,
            #[prost(fixed64, tag = "4")]
            pub count: u64,
            #[prost(double, optional, tag = "5")]
            pub sum: ::core::option::Option<f64>,
            #[prost(fixed64, repeated, tag = "6")]
            pub bucket_counts: ::prost::alloc::vec::Vec<u64>,
            #[prost(double, repeated, tag = "7")]
            pub explicit_bounds: ::prost::alloc::vec::Vec<f64>,
            #[prost(message, repeated, tag = "8")]
            pub exemplars: ::prost::alloc::vec::Vec<Exemplar>,
            #[prost(uint32, tag = "10")]
            pub flags: u32,
            #[prost(double, optional, tag = "11")]
            pub min: ::core::option::Option<f64>,
            #[prost(double, optional, tag = "12")]
            pub max: ::core::option::Option<f64>,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ExponentialHistogramDataPoint {
            #[prost(message, repeated, tag = "1")]
            pub attributes: ::prost::alloc::vec::Vec<common::v1::KeyValue>,
            #[prost(fixed64, tag = "2")]
            pub start_time_unix_nano: u64,
            #[prost(fixed64, tag = "3")]
            pub time_unix_nano: u64,
            #[prost(fixed64, tag = "4")]
            pub count: u64,
            #[prost(double, optional, tag = "5")]
            pub sum: ::core::option::Option<f64>,
            #[prost(sint32, tag = "6")]
            pub scale: i32,
            #[prost(fixed64, tag = "7")]
            pub zero_count: u64,
            #[prost(message, optional, tag = "8")]
            pub positive: ::core::option::Option<exponential_histogram_data_point::Buckets>,
            #[prost(message, optional, tag = "9")]
            pub negative: ::core::option::Option<exponential_histogram_data_point::Buckets>,
            #[prost(uint32, tag = "10")]
            pub flags: u32,
            #[prost(message, repeated, tag = "11")]
            pub exemplars: ::prost::alloc::vec::Vec<Exemplar>,
            #[prost(double, optional, tag = "12")]
            pub min: ::core::option::Option<f64>,
            #[prost(double, optional, tag = "13")]
            pub max: ::core::option::Option<f64>,
            #[prost(double, tag = "14")]
            pub zero_threshold: f64,
        }

        pub mod exponential_histogram_data_point {
            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct Buckets {
                #[prost(sint32, tag = "1")]
                pub offset: i32,
                #[prost(uint64, repeated, tag = "2")]
                pub bucket_counts: ::prost::alloc::vec::Vec<u64>,
            }
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct SummaryDataPoint {
            #[prost(message, repeated, tag = "7")]
            pub attributes: ::prost::alloc::vec::Vec<common::v1::KeyValue>,
            #[prost(fixed64, tag = "2")]
            pub start_time_unix_nano: u64,
            #[prost(fixed64, tag = "3")]
            pub time_unix_nano: u64,
            #[prost(fixed64, tag = "4")]
            pub count: u64,
            #[prost(double, tag = "5")]
            pub sum: f64,
            #[prost(message, repeated, tag = "6")]
            pub quantile_values:
                ::prost::alloc::vec::Vec<summary_data_point::ValueAtQuantile>,
            #[prost(uint32, tag = "8")]
            pub flags: u32,
        }

        pub mod summary_data_point {
            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct ValueAtQuantile {
                #[prost(double, tag = "1")]
                pub quantile: f64,
                #[prost(double, tag = "2")]
                pub value: f64,
            }
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Exemplar {
            #[prost(message, repeated, tag = "7")]
            pub filtered_attributes: ::prost::alloc::vec::Vec<common::v1::KeyValue>,
            #[prost(fixed64, tag = "2")]
            pub time_unix_nano: u64,
            #[prost(bytes = "vec", tag = "4")]
            pub span_id: ::prost::alloc::vec::Vec<u8>,
            #[prost(bytes = "vec", tag = "5")]
            pub trace_id: ::prost::alloc::vec::Vec<u8>,
            #[prost(oneof = "exemplar::Value", tags = "3, 6")]
            pub value: ::core::option::Option<exemplar::Value>,
        }

        pub mod exemplar {
            #[derive(Clone, PartialEq, ::prost::Oneof)]
            pub enum Value {
                #[prost(double, tag = "3")]
                AsDouble(f64),
                #[prost(sfixed64, tag = "6")]
                AsInt(i64),
            }
        }
    }
}

pub mod collector {
    //! Collector service types.

    pub mod trace {
        //! Trace collector service.
        pub mod v1 {
            use super::super::super::trace;

            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct ExportTraceServiceRequest {
                #[prost(message, repeated, tag = "1")]
                pub resource_spans: ::prost::alloc::vec::Vec<trace::v1::ResourceSpans>,
            }

            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct ExportTraceServiceResponse {
                #[prost(message, optional, tag = "1")]
                pub partial_success: ::core::option::Option<ExportTracePartialSuccess>,
            }

            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct ExportTracePartialSuccess {
                #[prost(int64, tag = "1")]
                pub rejected_spans: i64,
                #[prost(string, tag = "2")]
                pub error_message: ::prost::alloc::string::String,
            }
        }
    }

    pub mod logs {
        //! Log collector service.
        pub mod v1 {
            use super::super::super::logs;

            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct ExportLogsServiceRequest {
                #[prost(message, repeated, tag = "1")]
                pub resource_logs: ::prost::alloc::vec::Vec<logs::v1::ResourceLogs>,
            }

            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct ExportLogsServiceResponse {
                #[prost(message, optional, tag = "1")]
                pub partial_success: ::core::option::Option<ExportLogsPartialSuccess>,
            }

            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct ExportLogsPartialSuccess {
                #[prost(int64, tag = "1")]
                pub rejected_log_records: i64,
                #[prost(string, tag = "2")]
                pub error_message: ::prost::alloc::string::String,
            }
        }
    }

    pub mod metrics {
        //! Metrics collector service.
        pub mod v1 {
            use super::super::super::metrics;

            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct ExportMetricsServiceRequest {
                #[prost(message, repeated, tag = "1")]
                pub resource_metrics: ::prost::alloc::vec::Vec<metrics::v1::ResourceMetrics>,
            }

            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct ExportMetricsServiceResponse {
                #[prost(message, optional, tag = "1")]
                pub partial_success: ::core::option::Option<ExportMetricsPartialSuccess>,
            }

            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct ExportMetricsPartialSuccess {
                #[prost(int64, tag = "1")]
                pub rejected_data_points: i64,
                #[prost(string, tag = "2")]
                pub error_message: ::prost::alloc::string::String,
            }
        }
    }
}
