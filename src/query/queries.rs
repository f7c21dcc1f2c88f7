/// 상품 등록
pub const INSERT_ITEM: &str = r#"
    INSERT INTO items (owner_id, title, description, minimum_price,
                       created_at, end_time, posting_fee)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING id, owner_id, title, description, minimum_price, created_at, end_time,
              authentication_status, auction_status, final_price, posting_fee
"#;

/// 상품 조회
pub const GET_ITEM: &str = r#"
    SELECT id, owner_id, title, description, minimum_price, created_at, end_time,
           authentication_status, auction_status, final_price, posting_fee
    FROM items
    WHERE id = $1
"#;

/// 상품 조회 (행 잠금)
pub const GET_ITEM_FOR_UPDATE: &str = r#"
    SELECT id, owner_id, title, description, minimum_price, created_at, end_time,
           authentication_status, auction_status, final_price, posting_fee
    FROM items
    WHERE id = $1
    FOR UPDATE
"#;

/// 모든 상품 조회
pub const GET_ALL_ITEMS: &str = r#"
    SELECT id, owner_id, title, description, minimum_price, created_at, end_time,
           authentication_status, auction_status, final_price, posting_fee
    FROM items
    ORDER BY created_at DESC, id DESC
"#;

/// 경매 상태별 상품 조회
pub const GET_ITEMS_BY_STATUS: &str = r#"
    SELECT id, owner_id, title, description, minimum_price, created_at, end_time,
           authentication_status, auction_status, final_price, posting_fee
    FROM items
    WHERE auction_status = $1
    ORDER BY end_time ASC, id ASC
"#;

/// 경매/감정 상태 갱신
pub const UPDATE_ITEM_STATE: &str = r#"
    UPDATE items
    SET auction_status = $2, authentication_status = $3, final_price = $4
    WHERE id = $1
"#;

/// 상품 삭제 (입찰, 감정 요청은 ON DELETE CASCADE)
pub const DELETE_ITEM: &str = "DELETE FROM items WHERE id = $1";

/// 상품 입찰 조회 (입력 순서 = 시간 순서)
pub const GET_ITEM_BIDS: &str = r#"
    SELECT id, item_id, bidder_id, amount, placed_at
    FROM bids
    WHERE item_id = $1
    ORDER BY id ASC
"#;

/// 입찰 추가
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (item_id, bidder_id, amount, placed_at)
    VALUES ($1, $2, $3, $4)
    RETURNING id, item_id, bidder_id, amount, placed_at
"#;

/// 감정 요청 등록
pub const INSERT_AUTHENTICATION_REQUEST: &str = r#"
    INSERT INTO authentication_requests (item_id, requester_id, created_at)
    VALUES ($1, $2, $3)
    RETURNING id, item_id, requester_id, assigned_expert_id, second_expert_id, status,
              first_decision, second_opinion_requested, comments, created_at, decided_at
"#;

/// 감정 요청 조회
pub const GET_AUTHENTICATION_REQUEST: &str = r#"
    SELECT id, item_id, requester_id, assigned_expert_id, second_expert_id, status,
           first_decision, second_opinion_requested, comments, created_at, decided_at
    FROM authentication_requests
    WHERE id = $1
"#;

/// 상품별 감정 요청 조회
pub const GET_ITEM_AUTHENTICATION_REQUESTS: &str = r#"
    SELECT id, item_id, requester_id, assigned_expert_id, second_expert_id, status,
           first_decision, second_opinion_requested, comments, created_at, decided_at
    FROM authentication_requests
    WHERE item_id = $1
    ORDER BY id ASC
"#;

/// 감정 요청의 상품 id 조회
pub const GET_REQUEST_ITEM_ID: &str = "SELECT item_id FROM authentication_requests WHERE id = $1";

/// 감정 요청 갱신
pub const UPDATE_AUTHENTICATION_REQUEST: &str = r#"
    UPDATE authentication_requests
    SET assigned_expert_id = $2,
        second_expert_id = $3,
        status = $4,
        first_decision = $5,
        second_opinion_requested = $6,
        comments = $7,
        decided_at = $8
    WHERE id = $1
"#;
