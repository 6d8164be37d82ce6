table! {
    access_rules (node, group) {
        node -> Int4,
        group -> Int4,
        permission -> Int4,
    }
}

table! {
    group_members (group, user) {
        group -> Int4,
        user -> Int4,
    }
}

table! {
    groups (id) {
        id -> Int4,
        name -> Varchar,
    }
}

table! {
    node_tags (node, tag) {
        node -> Int4,
        tag -> Varchar,
    }
}

table! {
    nodes (id) {
        id -> Int4,
        parent -> Nullable<Int4>,
        slug -> Varchar,
        class -> Varchar,
        max_version -> Int4,
        max_released_version -> Int4,
        workflow -> Nullable<Int4>,
        children_workflow -> Nullable<Int4>,
        indexed_at -> Nullable<Timestamp>,
    }
}

table! {
    versions (node, version) {
        node -> Int4,
        version -> Int4,
        changed -> Timestamp,
        note -> Text,
        content -> Text,
        workflow_group -> Int4,
    }
}

table! {
    workflow_groups (workflow, position) {
        workflow -> Int4,
        position -> Int4,
        group -> Int4,
    }
}

table! {
    workflows (id) {
        id -> Int4,
        name -> Varchar,
    }
}

joinable!(group_members -> groups (group));
joinable!(node_tags -> nodes (node));
joinable!(versions -> nodes (node));
joinable!(workflow_groups -> workflows (workflow));

allow_tables_to_appear_in_same_query!(
    access_rules,
    group_members,
    groups,
    node_tags,
    nodes,
    versions,
    workflow_groups,
    workflows,
);
