use axum::Json;
use serde_json::{json, Value};

/// `GET /api-docs.json`: OpenAPI 3.0 description of the query API
pub async fn openapi() -> Json<Value> {
    Json(openapi_document())
}

fn metric_param(description: &str) -> Value {
    json!({
        "in": "query",
        "name": "metric",
        "schema": { "type": "string", "enum": ["tvl", "liquidity"], "default": "tvl" },
        "description": description
    })
}

fn error_content() -> Value {
    json!({ "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } })
}

fn schemas() -> Value {
    json!({
        "ErrorResponse": {
            "type": "object",
            "properties": {
                "success": { "type": "boolean", "example": false },
                "error": {
                    "type": "object",
                    "properties": {
                        "code": {
                            "type": "string",
                            "enum": ["VALIDATION_ERROR", "NOT_FOUND", "INTERNAL_ERROR"]
                        },
                        "message": { "type": "string" },
                        "details": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "field": { "type": "string" },
                                    "message": { "type": "string" },
                                    "received": { "type": "string" }
                                }
                            }
                        }
                    }
                }
            }
        },
        "Filters": {
            "type": "object",
            "properties": { "chainId": { "type": "string" } }
        },
        "TvlResponse": {
            "type": "object",
            "properties": {
                "success": { "type": "boolean", "example": true },
                "data": {
                    "type": "object",
                    "properties": {
                        "tvl": { "type": "integer", "description": "Total Value Locked in cents", "example": 63949 },
                        "currency": { "type": "string", "enum": ["cents"], "example": "cents" },
                        "filters": { "$ref": "#/components/schemas/Filters" }
                    }
                }
            }
        },
        "LiquidityResponse": {
            "type": "object",
            "properties": {
                "success": { "type": "boolean", "example": true },
                "data": {
                    "type": "object",
                    "properties": {
                        "liquidity": { "type": "integer", "description": "Supply minus borrow in cents; may be negative", "example": 38231 },
                        "currency": { "type": "string", "enum": ["cents"], "example": "cents" },
                        "filters": { "$ref": "#/components/schemas/Filters" }
                    }
                }
            }
        },
        "MarketResponse": {
            "type": "object",
            "properties": {
                "success": { "type": "boolean", "example": true },
                "data": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "example": 1 },
                        "name": { "type": "string", "example": "Token 01" },
                        "chainId": { "type": "string", "example": "1" },
                        "tvl": { "type": "integer", "example": 10482 },
                        "liquidity": { "type": "integer", "example": 4567 },
                        "totalSupplyCents": { "type": "integer", "example": 10482 },
                        "totalBorrowCents": { "type": "integer", "example": 5915 },
                        "currency": { "type": "string", "enum": ["cents"], "example": "cents" }
                    }
                }
            }
        }
    })
}

pub fn openapi_document() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "TVL API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "API for querying Total Value Locked (TVL) and liquidity metrics across DeFi markets"
        },
        "servers": [{ "url": "/api/v1", "description": "API v1" }],
        "paths": {
            "/tvl": {
                "get": {
                    "summary": "Get Total Value Locked (TVL) or Liquidity",
                    "description": "Sum of total supply (TVL) or available liquidity across all markets, optionally filtered by chain ID",
                    "tags": ["TVL"],
                    "parameters": [
                        {
                            "in": "query",
                            "name": "chainId",
                            "schema": { "type": "string", "minLength": 1 },
                            "description": "Filter by blockchain chain ID (e.g. \"1\" for Ethereum, \"56\" for BSC)",
                            "example": "1"
                        },
                        metric_param("\"tvl\" for total supply, \"liquidity\" for supply minus borrows")
                    ],
                    "responses": {
                        "200": {
                            "description": "The selected metric",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "oneOf": [
                                            { "$ref": "#/components/schemas/TvlResponse" },
                                            { "$ref": "#/components/schemas/LiquidityResponse" }
                                        ]
                                    }
                                }
                            }
                        },
                        "400": { "description": "Invalid request parameters", "content": error_content() },
                        "500": { "description": "Unexpected error", "content": error_content() }
                    }
                }
            },
            "/markets": {
                "get": {
                    "summary": "Get market details by name",
                    "description": "TVL, liquidity and supply/borrow totals for one market, matched exactly by name",
                    "tags": ["Markets"],
                    "parameters": [
                        {
                            "in": "query",
                            "name": "name",
                            "required": true,
                            "schema": { "type": "string", "minLength": 1 },
                            "example": "Token 01"
                        },
                        metric_param("Accepted for symmetry with /tvl; both metrics are always returned")
                    ],
                    "responses": {
                        "200": {
                            "description": "Market detail",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/MarketResponse" }
                                }
                            }
                        },
                        "400": { "description": "Missing or empty name, or invalid metric", "content": error_content() },
                        "404": { "description": "Market not found", "content": error_content() },
                        "500": { "description": "Unexpected error", "content": error_content() }
                    }
                }
            }
        },
        "components": { "schemas": schemas() }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_both_routes() {
        let doc = openapi_document();
        assert_eq!(doc["openapi"], "3.0.0");
        assert!(doc["paths"]["/tvl"]["get"].is_object());
        assert!(doc["paths"]["/markets"]["get"]["responses"]["404"].is_object());
        assert_eq!(
            doc["paths"]["/tvl"]["get"]["parameters"][1]["schema"]["enum"],
            json!(["tvl", "liquidity"])
        );
        assert_eq!(
            doc["components"]["schemas"]["MarketResponse"]["properties"]["data"]["properties"]["currency"]["enum"],
            json!(["cents"])
        );
    }
}
