//! Diesel schema for task orchestration persistence.

diesel::table! {
    /// Units of work inside a pipeline stage.
    task (id) {
        /// Row identifier.
        id -> Int8,
        /// Creating principal.
        creator_id -> Int8,
        /// Creation timestamp.
        created_ts -> Timestamptz,
        /// Last updating principal.
        updater_id -> Int8,
        /// Last update timestamp.
        updated_ts -> Timestamptz,
        /// Owning pipeline.
        pipeline_id -> Int8,
        /// Owning stage.
        stage_id -> Int8,
        /// Target instance.
        instance_id -> Int8,
        /// Optional target database.
        database_id -> Nullable<Int8>,
        /// Task name.
        name -> Text,
        /// Declared task status.
        status -> Text,
        /// Task kind.
        #[sql_name = "type"]
        task_type -> Text,
        /// Executor payload.
        payload -> Jsonb,
        /// Scheduling floor.
        earliest_allowed_ts -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Execution attempts of tasks.
    task_run (id) {
        /// Row identifier.
        id -> Int8,
        /// Creating principal.
        creator_id -> Int8,
        /// Creation timestamp.
        created_ts -> Timestamptz,
        /// Last updating principal.
        updater_id -> Int8,
        /// Last update timestamp.
        updated_ts -> Timestamptz,
        /// Owning task.
        task_id -> Int8,
        /// Run name.
        name -> Text,
        /// Run status.
        status -> Text,
        /// Task kind at start time.
        #[sql_name = "type"]
        run_type -> Text,
        /// Task payload at start time.
        payload -> Jsonb,
        /// Result code.
        code -> Int4,
        /// Result payload.
        result -> Jsonb,
        /// Free-text comment.
        comment -> Text,
    }
}

diesel::table! {
    /// Validation attempts written by the external checker.
    task_check_run (id) {
        /// Row identifier.
        id -> Int8,
        /// Creating principal.
        creator_id -> Int8,
        /// Creation timestamp.
        created_ts -> Timestamptz,
        /// Last updating principal.
        updater_id -> Int8,
        /// Last update timestamp.
        updated_ts -> Timestamptz,
        /// Task under validation.
        task_id -> Int8,
        /// Check status.
        status -> Text,
        /// Check kind.
        #[sql_name = "type"]
        check_type -> Text,
        /// Result code.
        code -> Int4,
        /// Free-text comment.
        comment -> Text,
        /// Result payload.
        result -> Jsonb,
        /// Checker input payload.
        payload -> Jsonb,
    }
}

diesel::joinable!(task_run -> task (task_id));
diesel::joinable!(task_check_run -> task (task_id));
diesel::allow_tables_to_appear_in_same_query!(task, task_run, task_check_run);
